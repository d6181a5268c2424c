//! Bulk catalog import - Tabular product ingestion with lenient per-row
//! semantics.
//!
//! The importer collaborator hands the core already-split string rows (from
//! CSV or a spreadsheet export); this module resolves columns, normalizes
//! numbers, and inserts products row by row. Rows that fail to resolve a name
//! are skipped with a warning, never aborting the whole import - a deliberate
//! lenient policy distinct from the strict cart/ledger rules.
//!
//! Two input shapes are supported:
//! - a header-keyed table, one product per row, with English or Slovak
//!   column names,
//! - a "multi-row" price list where one product spans three physical rows
//!   separated by blank rows, with a compound "small / large" price cell.

use crate::{
    core::catalog::{self, NewProduct},
    entities::{Cycle, product},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::{BTreeMap, HashMap};

/// Result of a bulk import: what was inserted, and what was worth flagging.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Products inserted, in input order
    pub inserted: Vec<product::Model>,
    /// Per-row notes: skipped rows, assumed variants, swapped prices
    pub warnings: Vec<String>,
}

/// Lowercases and strips everything but letters and digits, so that
/// "Chuťový profil", "chutovy_profil", and "ChutovyProfil" all meet.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Finds the first non-empty cell whose column name matches one of the
/// aliases after normalization.
fn field<'a>(row: &'a HashMap<String, String>, aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        let wanted = normalize_key(alias);
        for (key, value) in row {
            if normalize_key(key) == wanted && !value.trim().is_empty() {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Parses a price cell in either locale convention: currency symbols and
/// whitespace are stripped, a decimal comma becomes a dot.
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Imports products from header-keyed rows (one product per row).
///
/// Column names are matched fuzzily across English and Slovak. Rows without a
/// resolvable name are skipped and reported in the warnings; each surviving
/// row is inserted independently, so a bad row never rolls back its
/// neighbours.
///
/// # Errors
/// Returns an error if the cycle does not exist or the database fails; never
/// for a malformed row.
pub async fn import_products(
    db: &DatabaseConnection,
    cycle_id: i64,
    rows: &[HashMap<String, String>],
) -> Result<ImportOutcome> {
    Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })?;

    let mut outcome = ImportOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        let Some(name) = field(row, &["name", "nazov", "názov"]) else {
            outcome
                .warnings
                .push(format!("row {}: missing product name, skipped", index + 1));
            continue;
        };

        let mut prices = BTreeMap::new();
        if let Some(price) = field(row, &["price250g", "cena250g", "250g"]).and_then(parse_price) {
            prices.insert("250g".to_string(), price);
        }
        if let Some(price) = field(row, &["price1kg", "cena1kg", "1kg"]).and_then(parse_price) {
            prices.insert("1kg".to_string(), price);
        }

        let new = NewProduct {
            name: name.to_string(),
            description1: field(row, &["description1", "popis1"]).map(str::to_string),
            description2: field(
                row,
                &["description2", "popis2", "chutovy profil", "chuťový profil"],
            )
            .map(str::to_string),
            roast_type: field(row, &["roast", "prazenie", "praženie"]).map(str::to_string),
            purpose: field(row, &["purpose", "ucel", "účel"]).map(str::to_string),
            image: None,
            prices,
        };

        let inserted = catalog::create_product(db, cycle_id, new).await?;
        outcome.inserted.push(inserted);
    }

    tracing::info!(
        cycle_id,
        inserted = outcome.inserted.len(),
        warnings = outcome.warnings.len(),
        "imported products"
    );
    Ok(outcome)
}

// Column positions in the multi-row price-list layout.
const NAME_COL: usize = 1;
// Column H carries the purpose on the first block row and the roast level on
// the third.
const META_COL: usize = 7;
const PRICE_COL: usize = 8;

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |c| c.trim())
}

/// A separator row is (almost) blank: at most one non-empty cell.
fn is_separator_row(row: &[String]) -> bool {
    row.iter().filter(|c| !c.trim().is_empty()).count() <= 1
}

/// Detects the products-section header row of the price-list layout.
fn is_section_header(row: &[String]) -> bool {
    let text = row.join(" ").to_lowercase();
    text.contains("praženie")
        || text.contains("prazenie")
        || text.contains("voc 5")
        || text.contains("voc 26")
        || text.contains("zrnková káva")
}

/// Prices extracted from one compound price cell.
struct PriceCell {
    prices: BTreeMap<String, f64>,
    warning: Option<String>,
}

/// Splits a compound "small / large" price cell and labels the halves from
/// the header text accompanying the product.
///
/// When the larger variant ends up cheaper than the smaller one, the two
/// halves are swapped and the swap is flagged - transposed spreadsheet
/// authoring is common enough that it must not be trusted silently.
fn parse_price_cell(raw: &str, variant_label: &str) -> PriceCell {
    let mut result = PriceCell {
        prices: BTreeMap::new(),
        warning: None,
    };
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return result;
    }

    let label = variant_label.to_lowercase();
    let small_label = if label.contains("150") {
        "150g"
    } else if label.contains("200") {
        "200g"
    } else {
        "250g"
    };

    let mut parts: Option<Vec<&str>> = None;
    for sep in [" / ", "/", " - ", "-"] {
        if normalized.contains(sep) {
            let split: Vec<&str> = normalized
                .split(sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            if split.len() == 2 {
                parts = Some(split);
                break;
            }
        }
    }

    let Some(parts) = parts else {
        if let Some(single) = parse_price(&normalized) {
            result.prices.insert(small_label.to_string(), single);
            if !label.contains("150") && !label.contains("200") {
                result.warning = Some("single price found, assumed 250g".to_string());
            }
        }
        return result;
    };

    let mut small = parse_price(parts[0]);
    let mut large = parse_price(parts[1]);

    if let (Some(s), Some(l)) = (small, large) {
        if l < s {
            (small, large) = (Some(l), Some(s));
            result.warning = Some(format!(
                "prices were swapped ({small_label} was priced above 1kg)"
            ));
        }
    }

    if let Some(s) = small {
        result.prices.insert(small_label.to_string(), s);
    }
    if let Some(l) = large {
        result.prices.insert("1kg".to_string(), l);
    }
    result
}

/// One product assembled from a three-row block.
#[derive(Debug)]
struct ParsedBlock {
    name: String,
    description1: Option<String>,
    description2: Option<String>,
    roast_type: Option<String>,
    purpose: Option<String>,
    prices: BTreeMap<String, f64>,
}

/// Walks the positional rows of the price-list layout and assembles product
/// blocks. Pure parsing, no database access.
fn parse_multirow(rows: &[Vec<String>]) -> (Vec<ParsedBlock>, Vec<String>) {
    let mut products = Vec::new();
    let mut warnings = Vec::new();

    let mut in_section = false;
    let mut current: Option<ParsedBlock> = None;
    let mut variant_label = String::new();
    let mut row_in_block = 0;

    for row in rows {
        // The leading header block ends at the first separator row.
        if !in_section {
            if is_separator_row(row) {
                in_section = true;
            }
            continue;
        }

        if is_section_header(row) {
            continue;
        }

        if is_separator_row(row) {
            if let Some(block) = current.take() {
                if !block.name.is_empty() {
                    products.push(block);
                }
            }
            row_in_block = 0;
            continue;
        }

        match row_in_block {
            0 => {
                // Row 1: name, purpose, and the "250g / 1kg"-style label
                variant_label = cell(row, PRICE_COL).to_string();
                current = Some(ParsedBlock {
                    name: cell(row, NAME_COL).to_string(),
                    description1: None,
                    description2: None,
                    roast_type: None,
                    purpose: (!cell(row, META_COL).is_empty())
                        .then(|| cell(row, META_COL).to_string()),
                    prices: BTreeMap::new(),
                });
                row_in_block = 1;
            }
            1 => {
                // Row 2: description and the actual price cell
                if let Some(block) = current.as_mut() {
                    let description = cell(row, NAME_COL);
                    block.description1 =
                        (!description.is_empty()).then(|| description.to_string());

                    let parsed = parse_price_cell(cell(row, PRICE_COL), &variant_label);
                    block.prices = parsed.prices;
                    if let Some(warning) = parsed.warning {
                        warnings.push(format!("\"{}\": {warning}", block.name));
                    }
                }
                row_in_block = 2;
            }
            _ => {
                // Row 3: flavor profile and roast level; block complete
                if let Some(mut block) = current.take() {
                    let flavor = cell(row, NAME_COL);
                    block.description2 = (!flavor.is_empty()).then(|| flavor.to_string());
                    let roast = cell(row, META_COL);
                    block.roast_type = (!roast.is_empty()).then(|| roast.to_string());
                    if !block.name.is_empty() {
                        products.push(block);
                    }
                }
                row_in_block = 0;
            }
        }
    }

    // Input that doesn't end with a separator still yields its last block.
    if let Some(block) = current.take() {
        if !block.name.is_empty() {
            products.push(block);
        }
    }

    (products, warnings)
}

/// Imports products from the multi-row price-list layout (three rows per
/// product, blank-row separated).
///
/// # Errors
/// Returns an error if the cycle does not exist or the database fails; never
/// for a malformed block.
pub async fn import_products_multirow(
    db: &DatabaseConnection,
    cycle_id: i64,
    rows: &[Vec<String>],
) -> Result<ImportOutcome> {
    Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })?;

    let (blocks, warnings) = parse_multirow(rows);
    let mut outcome = ImportOutcome {
        inserted: Vec::new(),
        warnings,
    };

    for block in blocks {
        let new = NewProduct {
            name: block.name,
            description1: block.description1,
            description2: block.description2,
            roast_type: block.roast_type,
            purpose: block.purpose,
            image: None,
            prices: block.prices,
        };
        let inserted = catalog::create_product(db, cycle_id, new).await?;
        outcome.inserted.push(inserted);
    }

    tracing::info!(
        cycle_id,
        inserted = outcome.inserted.len(),
        warnings = outcome.warnings.len(),
        "imported products (multi-row layout)"
    );
    Ok(outcome)
}
