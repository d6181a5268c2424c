//! Friend entity - Represents a participant in the group buy.
//!
//! Friends are global (not scoped to a cycle) and may place at most one order
//! per cycle. A friend's balance is never stored; it is always the sum of
//! their ledger transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Friend database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friends")]
pub struct Model {
    /// Unique identifier for the friend
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name the friend picks on the ordering page
    pub name: String,
    /// Optional admin-facing display name
    pub display_name: Option<String>,
    /// Soft-disable flag; inactive friends cannot place orders
    pub active: bool,
    /// When the friend was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Friend and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One friend has many orders (at most one per cycle)
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One friend has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
