//! Catalog business logic - Products, variants, and price resolution.
//!
//! A product's orderable variants live in the `product_variants` table; a
//! missing row means the variant is unavailable, never "free". Price
//! resolution applies the cycle markup ratio and rounds half-up to 2 decimal
//! places; that rounded value is what gets snapshotted into order items.

use crate::{
    core::money::round2,
    entities::{Cycle, Product, ProductVariant, cycle, product, product_variant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;

/// Input for creating a catalog product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Product name, required
    pub name: String,
    /// First description line
    pub description1: Option<String>,
    /// Second description line (flavor profile)
    pub description2: Option<String>,
    /// Roast level
    pub roast_type: Option<String>,
    /// Intended use (Filter, Espresso, ...)
    pub purpose: Option<String>,
    /// Image data URL
    pub image: Option<String>,
    /// Variant label to base unit price
    pub prices: BTreeMap<String, f64>,
}

/// Explicit partial update for a product.
///
/// Absent fields are left untouched. Nullable columns use a nested `Option`
/// so that `Some(None)` clears them. Price entries with `Some(price)` upsert
/// the variant; `None` removes it (making the variant unavailable).
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New product name
    pub name: Option<String>,
    /// New first description line
    pub description1: Option<Option<String>>,
    /// New second description line
    pub description2: Option<Option<String>>,
    /// New roast level
    pub roast_type: Option<Option<String>>,
    /// New intended use
    pub purpose: Option<Option<String>>,
    /// New image data URL
    pub image: Option<Option<String>>,
    /// Soft-delete / restore
    pub active: Option<bool>,
    /// Variant price upserts and removals
    pub prices: Option<BTreeMap<String, Option<f64>>>,
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(round2(price))
}

/// Resolves the unit price a friend pays for one variant of a product.
///
/// Looks up the variant's base price, applies the cycle's markup ratio, and
/// rounds half-up to 2 decimal places. Returns `None` when the product is
/// missing or inactive, or the variant has no price row - the caller treats
/// that as "not orderable right now", not as an error.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn price_for<C>(
    db: &C,
    product_id: i64,
    variant: &str,
    cycle: &cycle::Model,
) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let Some(product) = Product::find_by_id(product_id).one(db).await? else {
        return Ok(None);
    };
    if !product.active {
        return Ok(None);
    }

    let Some(row) = ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .filter(product_variant::Column::Variant.eq(variant))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    Ok(Some(round2(row.base_price * cycle.markup_ratio)))
}

/// Retrieves all active products of a cycle, grouped the way the order form
/// displays them (by purpose, then name).
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection, cycle_id: i64) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::CycleId.eq(cycle_id))
        .filter(product::Column::Active.eq(true))
        .order_by_asc(product::Column::Purpose)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the priced variants of a product, ordered by label.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn variants_of<C>(db: &C, product_id: i64) -> Result<Vec<product_variant::Model>>
where
    C: ConnectionTrait,
{
    ProductVariant::find()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .order_by_asc(product_variant::Column::Variant)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a product with its variant price rows in one transaction.
///
/// # Errors
/// Returns an error if the name is empty, the cycle does not exist, or any
/// price is non-positive or not finite.
pub async fn create_product(
    db: &DatabaseConnection,
    cycle_id: i64,
    new: NewProduct,
) -> Result<product::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "product name cannot be empty".to_string(),
        });
    }

    Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })?;

    let mut prices = Vec::with_capacity(new.prices.len());
    for (variant, price) in &new.prices {
        prices.push((variant.clone(), validate_price(*price)?));
    }

    let txn = db.begin().await?;

    let model = product::ActiveModel {
        cycle_id: Set(cycle_id),
        name: Set(new.name.trim().to_string()),
        description1: Set(new.description1),
        description2: Set(new.description2),
        roast_type: Set(new.roast_type),
        purpose: Set(new.purpose),
        image: Set(new.image),
        active: Set(true),
        ..Default::default()
    };
    let inserted = model.insert(&txn).await?;

    for (variant, price) in prices {
        let row = product_variant::ActiveModel {
            product_id: Set(inserted.id),
            variant: Set(variant),
            base_price: Set(price),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(inserted)
}

/// Applies a partial update to a product, including variant price upserts and
/// removals, as one transaction.
///
/// # Errors
/// Returns an error if the product does not exist, the new name is empty, or
/// a new price is non-positive or not finite.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: ProductUpdate,
) -> Result<product::Model> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "product name cannot be empty".to_string(),
            });
        }
    }

    let mut price_changes = Vec::new();
    if let Some(prices) = &update.prices {
        for (variant, price) in prices {
            match price {
                Some(p) => price_changes.push((variant.clone(), Some(validate_price(*p)?))),
                None => price_changes.push((variant.clone(), None)),
            }
        }
    }

    let txn = db.begin().await?;

    let mut model: product::ActiveModel = existing.into();
    if let Some(name) = update.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(description1) = update.description1 {
        model.description1 = Set(description1);
    }
    if let Some(description2) = update.description2 {
        model.description2 = Set(description2);
    }
    if let Some(roast_type) = update.roast_type {
        model.roast_type = Set(roast_type);
    }
    if let Some(purpose) = update.purpose {
        model.purpose = Set(purpose);
    }
    if let Some(image) = update.image {
        model.image = Set(image);
    }
    if let Some(active) = update.active {
        model.active = Set(active);
    }
    let updated = model.update(&txn).await?;

    for (variant, price) in price_changes {
        let existing_row = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .filter(product_variant::Column::Variant.eq(variant.as_str()))
            .one(&txn)
            .await?;

        match (existing_row, price) {
            (Some(row), Some(p)) => {
                let mut row: product_variant::ActiveModel = row.into();
                row.base_price = Set(p);
                row.update(&txn).await?;
            }
            (None, Some(p)) => {
                let row = product_variant::ActiveModel {
                    product_id: Set(product_id),
                    variant: Set(variant),
                    base_price: Set(p),
                    ..Default::default()
                };
                row.insert(&txn).await?;
            }
            (Some(row), None) => {
                row.delete(&txn).await?;
            }
            (None, None) => {}
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Soft-deletes a product so it disappears from the order form while
/// historical order items keep a valid reference.
///
/// # Errors
/// Returns an error if the product does not exist.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut model: product::ActiveModel = existing.into();
    model.active = Set(false);
    model.update(db).await?;
    Ok(())
}
