//! Friend business logic - Roster management with a balance-guarded delete.
//!
//! Friends are soft-disabled via the `active` flag for everyday use; hard
//! deletion is only possible once their ledger balance is settled, because
//! removing a friend cascades their entire ledger history.

use crate::{
    core::{ledger, money},
    entities::{Friend, friend},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Explicit partial update for a friend. Absent fields are left untouched;
/// `display_name: Some(None)` clears the display name.
#[derive(Debug, Default, Clone)]
pub struct FriendUpdate {
    /// New login name
    pub name: Option<String>,
    /// New admin-facing display name (`Some(None)` clears it)
    pub display_name: Option<Option<String>>,
    /// Enable / soft-disable
    pub active: Option<bool>,
}

/// Creates a new active friend.
///
/// # Errors
/// Returns an error if the name is empty.
pub async fn create_friend(db: &DatabaseConnection, name: &str) -> Result<friend::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "friend name cannot be empty".to_string(),
        });
    }

    let model = friend::ActiveModel {
        name: Set(name.trim().to_string()),
        display_name: Set(None),
        active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific friend by their unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_friend(db: &DatabaseConnection, friend_id: i64) -> Result<Option<friend::Model>> {
    Friend::find_by_id(friend_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists friends ordered by name, optionally restricted to active ones.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_friends(db: &DatabaseConnection, active_only: bool) -> Result<Vec<friend::Model>> {
    let mut query = Friend::find();
    if active_only {
        query = query.filter(friend::Column::Active.eq(true));
    }
    query
        .order_by_asc(friend::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a friend.
///
/// # Errors
/// Returns an error if the friend does not exist or the new name is empty.
pub async fn update_friend(
    db: &DatabaseConnection,
    friend_id: i64,
    update: FriendUpdate,
) -> Result<friend::Model> {
    let existing = Friend::find_by_id(friend_id)
        .one(db)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "friend name cannot be empty".to_string(),
            });
        }
    }

    let mut model: friend::ActiveModel = existing.into();
    if let Some(name) = update.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(display_name) = update.display_name {
        model.display_name = Set(display_name);
    }
    if let Some(active) = update.active {
        model.active = Set(active);
    }

    model.update(db).await.map_err(Into::into)
}

/// Deletes a friend together with their orders and ledger history.
///
/// Blocked while the friend's balance is not settled (beyond the one-cent
/// epsilon): the money owed either way must be resolved first, through a
/// payment or a reasoned adjustment. Balance check and delete run in one
/// transaction so a concurrent ledger write cannot slip between them.
///
/// # Errors
/// Returns an error if the friend does not exist or their balance is not
/// settled.
pub async fn delete_friend(db: &DatabaseConnection, friend_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Friend::find_by_id(friend_id)
        .one(&txn)
        .await?
        .ok_or(Error::FriendNotFound { id: friend_id })?;

    let balance = ledger::balance_of(&txn, friend_id).await?;
    if !money::is_settled(balance) {
        return Err(Error::Precondition {
            message: format!("friend {friend_id} has an unsettled balance of {balance:.2}"),
        });
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(friend_id, "friend deleted");
    Ok(())
}
