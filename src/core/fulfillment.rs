//! Fulfillment business logic - Couples paid/packed flags to the ledger.
//!
//! Money only moves here. Marking an order paid credits the friend with the
//! order total; packing debits it - "packed" means the goods were handed over
//! and the friend now owes that amount. Submission alone never touches the
//! ledger. Every flag flip and its ledger entry commit as one transaction, so
//! a reader can never see one without the other. Reversals append a negating
//! entry instead of deleting history.

use crate::{
    core::ledger,
    entities::{Order, order, transaction},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};

async fn find_submitted_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    if order.status != order::OrderStatus::Submitted {
        return Err(Error::Precondition {
            message: format!("order {order_id} is not submitted"),
        });
    }
    Ok(order)
}

/// Sets the paid flag on a submitted order, settling or un-settling it in the
/// ledger.
///
/// Marking paid records a payment of +total; unmarking records the exact
/// negation, note-tagged as a storno, so the audit trail keeps both the
/// original and its cancellation. Idempotent with respect to the current
/// flag: setting paid on an already-paid order creates no duplicate entry.
///
/// # Errors
/// Returns an error if the order does not exist or is not submitted.
pub async fn set_paid(db: &DatabaseConnection, order_id: i64, paid: bool) -> Result<order::Model> {
    let order = find_submitted_order(db, order_id).await?;

    if order.paid == paid {
        return Ok(order);
    }

    let txn = db.begin().await?;

    let (amount, note) = if paid {
        (order.total, format!("Order #{order_id} paid"))
    } else {
        (-order.total, format!("Order #{order_id} payment storno"))
    };
    ledger::insert_entry(
        &txn,
        order.friend_id,
        Some(order.id),
        transaction::TransactionKind::Payment,
        amount,
        Some(note),
        chrono::Utc::now(),
    )
    .await?;

    let friend_id = order.friend_id;
    let mut model: order::ActiveModel = order.into();
    model.paid = Set(paid);
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(order_id, friend_id, paid, amount, "paid flag changed");
    Ok(updated)
}

/// Toggles the packed flag on a submitted order, debiting or re-crediting the
/// friend.
///
/// Packing stamps the packed time and records a charge of -total; unpacking
/// clears the stamp and records the reversing charge of +total. The charge
/// entries created here are immutable through the ledger's edit paths.
///
/// # Errors
/// Returns an error if the order does not exist or is not submitted.
pub async fn toggle_packed(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let order = find_submitted_order(db, order_id).await?;

    let packing = !order.packed;

    let txn = db.begin().await?;

    let (amount, note) = if packing {
        (-order.total, format!("Order #{order_id} packed"))
    } else {
        (order.total, format!("Order #{order_id} unpacked, storno"))
    };
    ledger::insert_entry(
        &txn,
        order.friend_id,
        Some(order.id),
        transaction::TransactionKind::Charge,
        amount,
        Some(note),
        chrono::Utc::now(),
    )
    .await?;

    let friend_id = order.friend_id;
    let mut model: order::ActiveModel = order.into();
    model.packed = Set(packing);
    model.packed_at = Set(packing.then(chrono::Utc::now));
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(order_id, friend_id, packed = packing, amount, "packed flag changed");
    Ok(updated)
}
