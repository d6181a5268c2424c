//! Transaction entity - An append-only ledger of monetary events per friend.
//!
//! A friend's balance is always the sum of their transaction amounts;
//! positive amounts mean the friend owes less (credit), negative amounts mean
//! they owe more. Charge entries are system-generated and immutable; payment
//! and adjustment entries may be edited or deleted by the admin.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionKind {
    /// Money received from the friend (or a reversal of one)
    #[sea_orm(string_value = "payment")]
    Payment,
    /// System-generated debit when an order is packed (or its reversal)
    #[sea_orm(string_value = "charge")]
    Charge,
    /// Manual, reasoned correction by the admin
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Friend whose balance this entry affects
    pub friend_id: i64,
    /// Optional order this entry settles or charges
    pub order_id: Option<i64>,
    /// Payment, charge, or adjustment
    pub kind: TransactionKind,
    /// Signed amount; positive increases the friend's balance
    pub amount: f64,
    /// Free-text note, at most 160 characters
    pub note: Option<String>,
    /// When the event happened (caller-settable for backdated payments)
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one friend
    #[sea_orm(
        belongs_to = "super::friend::Entity",
        from = "Column::FriendId",
        to = "super::friend::Column::Id",
        on_delete = "Cascade"
    )]
    Friend,
    /// Optional reference to the order that caused this entry
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "SetNull"
    )]
    Order,
}

impl Related<super::friend::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Friend.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
