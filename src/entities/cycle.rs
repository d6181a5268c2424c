//! Cycle entity - Represents one round of a recurring group order.
//!
//! Each cycle carries its own product catalog, an optional shared access
//! secret for the ordering page, and a markup ratio applied to catalog base
//! prices. The status gates whether orders may still be changed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a cycle. `Open` permits order mutation; `Locked` and
/// `Completed` both reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CycleStatus {
    /// Friends may create, change, and submit orders.
    #[sea_orm(string_value = "open")]
    Open,
    /// Order intake is closed; the admin is collecting/fulfilling.
    #[sea_orm(string_value = "locked")]
    Locked,
    /// The round is finished. Still write-blocking, like `Locked`.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl CycleStatus {
    /// Stable lowercase label, matching the stored string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Completed => "completed",
        }
    }
}

/// Cycle database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cycles")]
pub struct Model {
    /// Unique identifier for the cycle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "March coffee order")
    pub name: String,
    /// Lifecycle status gating order mutation
    pub status: CycleStatus,
    /// Optional shared secret friends must present to access the cycle
    pub shared_secret: Option<String>,
    /// Multiplier applied to catalog base prices (1.0 = pass-through)
    pub markup_ratio: f64,
    /// When the cycle was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Cycle and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One cycle has many catalog products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    /// One cycle has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
