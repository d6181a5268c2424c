//! Cart business logic - The draft/submitted order state machine.
//!
//! Each (friend, cycle) pair owns at most one order; a missing row means no
//! order exists. Cart writes are authoritative full replaces executed inside
//! a single transaction, so a reader can never observe a half-replaced cart.
//! Unit prices are snapshotted at save time; later catalog or markup changes
//! never touch an existing cart.

use crate::{
    core::{catalog, cycle as cycle_ops, money::round2},
    entities::{Cycle, Friend, Order, OrderItem, PickupLocation, cycle, friend, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// One requested cart line: what the friend wants, before price resolution.
#[derive(Debug, Clone)]
pub struct CartItem {
    /// Product to order
    pub product_id: i64,
    /// Variant label (e.g. "250g")
    pub variant: String,
    /// Requested quantity; non-positive lines are dropped
    pub quantity: i32,
}

async fn find_active_friend(db: &DatabaseConnection, friend_id: i64) -> Result<friend::Model> {
    let friend = Friend::find_by_id(friend_id)
        .one(db)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;
    if !friend.active {
        return Err(Error::Precondition {
            message: format!("friend {friend_id} is inactive"),
        });
    }
    Ok(friend)
}

async fn find_cycle(db: &DatabaseConnection, cycle_id: i64) -> Result<cycle::Model> {
    Cycle::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or(Error::CycleNotFound { id: cycle_id })
}

async fn find_order<C>(db: &C, friend_id: i64, cycle_id: i64) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::FriendId.eq(friend_id))
        .filter(order::Column::CycleId.eq(cycle_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_or_create_order<C>(db: &C, friend_id: i64, cycle_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = find_order(db, friend_id, cycle_id).await? {
        return Ok(existing);
    }

    let model = order::ActiveModel {
        friend_id: Set(friend_id),
        cycle_id: Set(cycle_id),
        status: Set(order::OrderStatus::Draft),
        paid: Set(false),
        packed: Set(false),
        total: Set(0.0),
        pickup_location_id: Set(None),
        submitted_at: Set(None),
        packed_at: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Returns the existing order for the pair, creating an empty draft if none
/// exists. Idempotent: repeated calls with no intervening writes return the
/// same order.
///
/// # Errors
/// Returns an error if the friend or cycle does not exist.
pub async fn get_or_create_draft(
    db: &DatabaseConnection,
    friend_id: i64,
    cycle_id: i64,
) -> Result<order::Model> {
    Friend::find_by_id(friend_id)
        .one(db)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;
    find_cycle(db, cycle_id).await?;

    find_or_create_order(db, friend_id, cycle_id).await
}

/// Retrieves the line items of an order, in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn cart_items(db: &DatabaseConnection, order_id: i64) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the entire cart for a (friend, cycle) pair.
///
/// All existing line items are deleted and the input lines re-priced through
/// the catalog; lines with non-positive quantity or an unresolvable
/// product/variant are silently dropped ("not orderable right now"). A cart
/// whose resulting total is zero deletes the order row entirely and returns
/// `None` - an empty cart is a cancellation, not a stored draft. The order's
/// status is left untouched otherwise. Delete, re-insert, and the total
/// update run in one transaction.
///
/// # Errors
/// Returns an error if the cycle is not open, the friend is missing or
/// inactive, or the cycle does not exist.
pub async fn replace_cart(
    db: &DatabaseConnection,
    friend_id: i64,
    cycle_id: i64,
    items: &[CartItem],
) -> Result<Option<order::Model>> {
    let friend = find_active_friend(db, friend_id).await?;
    let cycle = find_cycle(db, cycle_id).await?;
    cycle_ops::ensure_open(&cycle)?;

    let txn = db.begin().await?;

    let order = find_or_create_order(&txn, friend.id, cycle.id).await?;

    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;

    let mut total = 0.0;
    for item in items {
        if item.quantity <= 0 {
            continue;
        }
        let Some(price) = catalog::price_for(&txn, item.product_id, &item.variant, &cycle).await?
        else {
            continue;
        };

        let line = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            variant: Set(item.variant.clone()),
            quantity: Set(item.quantity),
            price: Set(price),
            ..Default::default()
        };
        line.insert(&txn).await?;

        total += price * f64::from(item.quantity);
    }
    let total = round2(total);

    if total == 0.0 {
        Order::delete_by_id(order.id).exec(&txn).await?;
        txn.commit().await?;
        tracing::info!(friend_id, cycle_id, "cart emptied, order removed");
        return Ok(None);
    }

    let mut model: order::ActiveModel = order.into();
    model.total = Set(total);
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(friend_id, cycle_id, total, "cart replaced");
    Ok(Some(updated))
}

/// Finalizes a draft order.
///
/// Requires an open cycle, an active friend, an existing order for the pair,
/// and at least one line item. Stamps the submission time. Submitting an
/// already-submitted order is a no-op returning the current row.
///
/// # Errors
/// Returns an error if the cycle is not open, the friend is missing or
/// inactive, no order exists, or the order has no items.
pub async fn submit(
    db: &DatabaseConnection,
    friend_id: i64,
    cycle_id: i64,
) -> Result<order::Model> {
    find_active_friend(db, friend_id).await?;
    let cycle = find_cycle(db, cycle_id).await?;
    cycle_ops::ensure_open(&cycle)?;

    let order = find_order(db, friend_id, cycle_id)
        .await?
        .ok_or(Error::DraftNotFound {
            friend_id,
            cycle_id,
        })?;

    let item_count = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .count(db)
        .await?;
    if item_count == 0 {
        return Err(Error::EmptyOrder { order_id: order.id });
    }

    if order.status == order::OrderStatus::Submitted {
        return Ok(order);
    }

    let order_id = order.id;
    let mut model: order::ActiveModel = order.into();
    model.status = Set(order::OrderStatus::Submitted);
    model.submitted_at = Set(Some(chrono::Utc::now()));
    let updated = model.update(db).await?;

    tracing::info!(friend_id, cycle_id, order_id, "order submitted");
    Ok(updated)
}

/// Sets or clears the pickup location on the pair's order.
///
/// # Errors
/// Returns an error if the cycle is not open, the friend is missing or
/// inactive, no order exists, or the location is missing or inactive.
pub async fn set_pickup_location(
    db: &DatabaseConnection,
    friend_id: i64,
    cycle_id: i64,
    location_id: Option<i64>,
) -> Result<order::Model> {
    find_active_friend(db, friend_id).await?;
    let cycle = find_cycle(db, cycle_id).await?;
    cycle_ops::ensure_open(&cycle)?;

    let order = find_order(db, friend_id, cycle_id)
        .await?
        .ok_or(Error::DraftNotFound {
            friend_id,
            cycle_id,
        })?;

    if let Some(location_id) = location_id {
        let location = PickupLocation::find_by_id(location_id)
            .one(db)
            .await?
            .ok_or(Error::PickupLocationNotFound { id: location_id })?;
        if !location.active {
            return Err(Error::PickupLocationNotFound { id: location_id });
        }
    }

    let mut model: order::ActiveModel = order.into();
    model.pickup_location_id = Set(location_id);
    model.update(db).await.map_err(Into::into)
}
