//! Ledger business logic - The append-only record of monetary events.
//!
//! A friend's balance is derived on every read by summing their transaction
//! amounts; no running total is stored anywhere, which removes staleness as a
//! failure mode. Payments and adjustments are recorded here by the admin;
//! charge entries are created only by the fulfillment coordinator and are
//! immutable afterwards.

use crate::{
    core::money::{clamp_note, round2},
    entities::{Friend, Order, Transaction, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Explicit partial update for a payment or adjustment entry.
///
/// Absent fields are left untouched. The outer `Option` on `note` carries
/// "change the note" vs "leave it"; the inner one allows clearing it.
#[derive(Debug, Default, Clone)]
pub struct TransactionUpdate {
    /// New signed amount
    pub amount: Option<f64>,
    /// New note (`Some(None)` clears it)
    pub note: Option<Option<String>>,
    /// New event timestamp (backdating)
    pub created_at: Option<DateTimeUtc>,
}

impl TransactionUpdate {
    fn is_empty(&self) -> bool {
        self.amount.is_none() && self.note.is_none() && self.created_at.is_none()
    }
}

/// Inserts a ledger entry without any kind-specific validation.
///
/// This is the single insertion path for all entry kinds. It is crate-private
/// so that charge entries can only originate from the fulfillment
/// coordinator, never from an external caller.
pub(crate) async fn insert_entry<C>(
    db: &C,
    friend_id: i64,
    order_id: Option<i64>,
    kind: transaction::TransactionKind,
    amount: f64,
    note: Option<String>,
    created_at: DateTimeUtc,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let entry = transaction::ActiveModel {
        friend_id: Set(friend_id),
        order_id: Set(order_id),
        kind: Set(kind),
        amount: Set(round2(amount)),
        note: Set(note.map(|n| clamp_note(&n))),
        created_at: Set(created_at),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Records a payment received from a friend.
///
/// The amount must be a positive, finite number. The note is truncated to 160
/// characters. `created_at` allows backdating a payment to when it actually
/// happened; it defaults to now.
///
/// # Errors
/// Returns an error if the amount is not positive or not finite, or if the
/// friend does not exist.
pub async fn record_payment(
    db: &DatabaseConnection,
    friend_id: i64,
    amount: f64,
    note: Option<String>,
    created_at: Option<DateTimeUtc>,
) -> Result<transaction::Model> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    Friend::find_by_id(friend_id)
        .one(db)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;

    let created_at = created_at.unwrap_or_else(chrono::Utc::now);
    let entry = insert_entry(
        db,
        friend_id,
        None,
        transaction::TransactionKind::Payment,
        amount,
        note,
        created_at,
    )
    .await?;

    tracing::info!(friend_id, amount = entry.amount, "recorded payment");
    Ok(entry)
}

/// Records a manual balance adjustment for a friend.
///
/// Adjustments require a non-zero amount and a non-empty note: a financial
/// correction without a reason is rejected. An optional order reference ties
/// the adjustment to a specific order, which must belong to the friend.
///
/// # Errors
/// Returns an error if the amount is zero or not finite, the note is empty,
/// the friend does not exist, or the referenced order does not belong to the
/// friend.
pub async fn record_adjustment(
    db: &DatabaseConnection,
    friend_id: i64,
    order_id: Option<i64>,
    amount: f64,
    note: &str,
) -> Result<transaction::Model> {
    if !amount.is_finite() || amount == 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let note = note.trim();
    if note.is_empty() {
        return Err(Error::Validation {
            message: "an adjustment requires a reason note".to_string(),
        });
    }

    Friend::find_by_id(friend_id)
        .one(db)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;

    if let Some(order_id) = order_id {
        let order = Order::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or(Error::OrderNotFound { id: order_id })?;
        if order.friend_id != friend_id {
            return Err(Error::OrderNotFound { id: order_id });
        }
    }

    let entry = insert_entry(
        db,
        friend_id,
        order_id,
        transaction::TransactionKind::Adjustment,
        amount,
        Some(note.to_string()),
        chrono::Utc::now(),
    )
    .await?;

    tracing::info!(friend_id, amount = entry.amount, "recorded adjustment");
    Ok(entry)
}

/// Computes a friend's balance as the sum of all their ledger entries.
///
/// This is always computed fresh from the transactions table; no cached value
/// exists to diverge.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn balance_of<C>(db: &C, friend_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let sum: Option<Option<f64>> = Transaction::find()
        .select_only()
        .column_as(transaction::Column::Amount.sum(), "balance")
        .filter(transaction::Column::FriendId.eq(friend_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(sum.flatten().unwrap_or(0.0))
}

/// Retrieves all ledger entries for a friend, most recent first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_entries(
    db: &DatabaseConnection,
    friend_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::FriendId.eq(friend_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific ledger entry by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_entry(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a payment or adjustment entry.
///
/// Charge entries are system-generated and immutable; attempting to edit one
/// fails with a permission error. Editing a payment keeps the positivity rule
/// from [`record_payment`]. The balance needs no recomputation because it is
/// derived on read.
///
/// # Errors
/// Returns an error if the entry does not exist, is a charge, the new amount
/// violates the kind's rules, or no field was supplied.
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<transaction::Model> {
    let existing = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    if existing.kind == transaction::TransactionKind::Charge {
        return Err(Error::PermissionDenied {
            message: "charge entries are immutable".to_string(),
        });
    }

    if update.is_empty() {
        return Err(Error::Validation {
            message: "no fields to update".to_string(),
        });
    }

    let kind = existing.kind;
    let mut model: transaction::ActiveModel = existing.into();

    if let Some(amount) = update.amount {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount { amount });
        }
        if kind == transaction::TransactionKind::Payment && amount <= 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
        if kind == transaction::TransactionKind::Adjustment && amount == 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
        model.amount = Set(round2(amount));
    }

    if let Some(note) = update.note {
        model.note = Set(note.map(|n| clamp_note(&n)));
    }

    if let Some(created_at) = update.created_at {
        model.created_at = Set(created_at);
    }

    model.update(db).await.map_err(Into::into)
}

/// Deletes a payment or adjustment entry.
///
/// Charge entries cannot be deleted; reversals are how charges are undone, so
/// the audit trail keeps both directions.
///
/// # Errors
/// Returns an error if the entry does not exist or is a charge.
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let existing = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    if existing.kind == transaction::TransactionKind::Charge {
        return Err(Error::PermissionDenied {
            message: "charge entries are immutable".to_string(),
        });
    }

    existing.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::friend;
    use crate::test_utils::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_payment_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = record_payment(&db, 1, bad, None, None).await;
            assert!(result.is_err());
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidAmount { amount: _ }
            ));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_friend_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<friend::Model>::new()])
            .into_connection();

        let result = record_payment(&db, 999, 10.0, None, None).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::FriendNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_integration() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let entry = record_payment(&db, friend.id, 25.0, Some("cash".to_string()), None).await?;
        assert_eq!(entry.amount, 25.0);
        assert_eq!(entry.kind, transaction::TransactionKind::Payment);
        assert_eq!(entry.note, Some("cash".to_string()));

        assert_eq!(balance_of(&db, friend.id).await?, 25.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_backdated() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let when = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let entry = record_payment(&db, friend.id, 10.0, None, Some(when)).await?;
        assert_eq!(entry.created_at, when);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_adjustment_requires_note() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let result = record_adjustment(&db, friend.id, None, 5.0, "   ").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_adjustment_rejects_zero() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = record_adjustment(&db, 1, None, 0.0, "reason").await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_adjustment_integration() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let entry = record_adjustment(&db, friend.id, None, -3.5, "broken bag").await?;
        assert_eq!(entry.amount, -3.5);
        assert_eq!(entry.kind, transaction::TransactionKind::Adjustment);

        assert_eq!(balance_of(&db, friend.id).await?, -3.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjustment_order_must_belong_to_friend() -> Result<()> {
        let db = setup_test_db().await?;
        let cycle = create_test_cycle(&db, "Cycle").await?;
        let friend = create_test_friend(&db, "anna").await?;
        let other = create_test_friend(&db, "bela").await?;
        let product = create_test_product(&db, cycle.id, "Beans").await?;
        let order = submit_test_order(&db, friend.id, cycle.id, product.id).await?;

        let result = record_adjustment(&db, other.id, Some(order.id), 2.0, "wrong friend").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::OrderNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_note_truncated_to_160_chars() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let long_note = "y".repeat(500);
        let entry = record_payment(&db, friend.id, 1.0, Some(long_note), None).await?;
        assert_eq!(entry.note.unwrap().chars().count(), 160);

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_entries() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        assert_eq!(balance_of(&db, friend.id).await?, 0.0);

        record_payment(&db, friend.id, 20.0, None, None).await?;
        record_adjustment(&db, friend.id, None, -4.5, "spillage").await?;
        record_payment(&db, friend.id, 0.5, None, None).await?;

        assert_eq!(balance_of(&db, friend.id).await?, 16.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_entries_newest_first() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let older = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        record_payment(&db, friend.id, 1.0, Some("old".to_string()), Some(older)).await?;
        record_payment(&db, friend.id, 2.0, Some("new".to_string()), None).await?;

        let entries = list_entries(&db, friend.id).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].note, Some("new".to_string()));
        assert_eq!(entries[1].note, Some("old".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_charge_is_immutable() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;

        let charge = insert_entry(
            &db,
            friend.id,
            None,
            transaction::TransactionKind::Charge,
            -12.5,
            None,
            chrono::Utc::now(),
        )
        .await?;

        let result = update_transaction(
            &db,
            charge.id,
            TransactionUpdate {
                amount: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::PermissionDenied { .. }
        ));

        let result = delete_transaction(&db, charge.id).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::PermissionDenied { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_payment_keeps_positivity_rule() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;
        let payment = record_payment(&db, friend.id, 10.0, None, None).await?;

        let result = update_transaction(
            &db,
            payment.id,
            TransactionUpdate {
                amount: Some(-10.0),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -10.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_fields() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;
        let payment = record_payment(&db, friend.id, 10.0, Some("iban".to_string()), None).await?;

        let when = chrono::Utc.with_ymd_and_hms(2025, 2, 2, 8, 0, 0).unwrap();
        let updated = update_transaction(
            &db,
            payment.id,
            TransactionUpdate {
                amount: Some(12.34),
                note: Some(None),
                created_at: Some(when),
            },
        )
        .await?;

        assert_eq!(updated.amount, 12.34);
        assert_eq!(updated.note, None);
        assert_eq!(updated.created_at, when);
        assert_eq!(balance_of(&db, friend.id).await?, 12.34);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_empty_update_rejected() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;
        let payment = record_payment(&db, friend.id, 10.0, None, None).await?;

        let result = update_transaction(&db, payment.id, TransactionUpdate::default()).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment_updates_balance() -> Result<()> {
        let (db, friend) = setup_with_friend().await?;
        let payment = record_payment(&db, friend.id, 10.0, None, None).await?;
        record_payment(&db, friend.id, 5.0, None, None).await?;

        delete_transaction(&db, payment.id).await?;
        assert_eq!(balance_of(&db, friend.id).await?, 5.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_transaction(&db, 999).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::TransactionNotFound { id: 999 }
        ));

        Ok(())
    }
}
