//! Report generation business logic.
//!
//! Two admin views over a cycle's submitted orders: the aggregate summary
//! that goes to the roastery (how much of what to order in bulk), and the
//! per-friend distribution list used while packing. Draft orders never appear
//! in either.

use crate::{
    core::money::round2,
    entities::{Cycle, Friend, Order, OrderItem, Product, cycle, friend, order, order_item},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// One aggregated line of the bulk order: a product variant with the summed
/// quantity and value across all submitted orders.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    /// Product name
    pub product_name: String,
    /// Variant label
    pub variant: String,
    /// Total ordered quantity
    pub quantity: i64,
    /// Total value at the snapshotted prices
    pub total_price: f64,
}

/// Aggregate view of a cycle's submitted orders.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    /// The cycle being summarized
    pub cycle: cycle::Model,
    /// Per product+variant lines, ordered by product name then variant
    pub lines: Vec<SummaryLine>,
    /// Sum of all quantities
    pub total_items: i64,
    /// Sum of all line values
    pub total_price: f64,
}

/// One line of a friend's packout.
#[derive(Debug, Clone, PartialEq)]
pub struct PackoutItem {
    /// Product name
    pub product_name: String,
    /// Variant label
    pub variant: String,
    /// Ordered quantity
    pub quantity: i32,
    /// Snapshotted unit price
    pub price: f64,
}

/// One friend's submitted order with its items, for the packing table.
#[derive(Debug, Clone)]
pub struct FriendPackout {
    /// The friend collecting
    pub friend: friend::Model,
    /// Their submitted order
    pub order: order::Model,
    /// Items sorted by product name
    pub items: Vec<PackoutItem>,
}

async fn submitted_orders(db: &DatabaseConnection, cycle_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::CycleId.eq(cycle_id))
        .filter(order::Column::Status.eq(order::OrderStatus::Submitted))
        .all(db)
        .await
        .map_err(Into::into)
}

async fn product_names(db: &DatabaseConnection, cycle_id: i64) -> Result<HashMap<i64, String>> {
    let products = Product::find()
        .filter(crate::entities::product::Column::CycleId.eq(cycle_id))
        .all(db)
        .await?;
    Ok(products.into_iter().map(|p| (p.id, p.name)).collect())
}

/// Builds the aggregate order summary for a cycle.
///
/// # Errors
/// Returns an error if the cycle does not exist.
pub async fn cycle_summary(db: &DatabaseConnection, cycle_id: i64) -> Result<CycleSummary> {
    let cycle = Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })?;

    let orders = submitted_orders(db, cycle_id).await?;
    let names = product_names(db, cycle_id).await?;

    let mut aggregate: BTreeMap<(String, String), (i64, f64)> = BTreeMap::new();
    for order in &orders {
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(db)
            .await?;
        for item in items {
            let name = names
                .get(&item.product_id)
                .cloned()
                .unwrap_or_else(|| format!("product {}", item.product_id));
            let entry = aggregate
                .entry((name, item.variant.clone()))
                .or_insert((0, 0.0));
            entry.0 += i64::from(item.quantity);
            entry.1 += item.price * f64::from(item.quantity);
        }
    }

    let mut total_items = 0;
    let mut total_price = 0.0;
    let lines: Vec<SummaryLine> = aggregate
        .into_iter()
        .map(|((product_name, variant), (quantity, value))| {
            total_items += quantity;
            total_price += value;
            SummaryLine {
                product_name,
                variant,
                quantity,
                total_price: round2(value),
            }
        })
        .collect();

    Ok(CycleSummary {
        cycle,
        lines,
        total_items,
        total_price: round2(total_price),
    })
}

/// Builds the per-friend distribution list for a cycle, ordered by friend
/// name.
///
/// # Errors
/// Returns an error if the cycle does not exist.
pub async fn distribution(db: &DatabaseConnection, cycle_id: i64) -> Result<Vec<FriendPackout>> {
    Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })?;

    let orders = submitted_orders(db, cycle_id).await?;
    let names = product_names(db, cycle_id).await?;

    let mut packouts = Vec::with_capacity(orders.len());
    for order in orders {
        let Some(friend) = Friend::find_by_id(order.friend_id).one(db).await? else {
            continue;
        };

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(db)
            .await?;
        let mut items: Vec<PackoutItem> = items
            .into_iter()
            .map(|item| PackoutItem {
                product_name: names
                    .get(&item.product_id)
                    .cloned()
                    .unwrap_or_else(|| format!("product {}", item.product_id)),
                variant: item.variant,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();
        items.sort_by(|a, b| a.product_name.cmp(&b.product_name));

        packouts.push(FriendPackout {
            friend,
            order,
            items,
        });
    }

    packouts.sort_by(|a, b| a.friend.name.cmp(&b.friend.name));
    Ok(packouts)
}
