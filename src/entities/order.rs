//! Order entity - At most one per (friend, cycle) pair.
//!
//! The `total` column is a persisted cache of the line-item sum, recomputed
//! on every cart replace. Money only moves when the fulfillment coordinator
//! flips `paid`/`packed`, never at submission time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order lifecycle state. There is no stored "none" state - a missing row
/// means no order exists for the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderStatus {
    /// Being edited by the friend, not yet finalized
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Finalized by the friend; admin may still flip paid/packed
    #[sea_orm(string_value = "submitted")]
    Submitted,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Friend who owns this order
    pub friend_id: i64,
    /// Cycle this order was placed in
    pub cycle_id: i64,
    /// Draft or submitted
    pub status: OrderStatus,
    /// Whether the friend has paid for this order
    pub paid: bool,
    /// Whether the goods were handed over
    pub packed: bool,
    /// Cached line-item sum, 2 decimal places
    pub total: f64,
    /// Optional pickup location the friend chose
    pub pickup_location_id: Option<i64>,
    /// When the order was submitted
    pub submitted_at: Option<DateTimeUtc>,
    /// When the order was packed
    pub packed_at: Option<DateTimeUtc>,
    /// When the order row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one friend
    #[sea_orm(
        belongs_to = "super::friend::Entity",
        from = "Column::FriendId",
        to = "super::friend::Column::Id",
        on_delete = "Cascade"
    )]
    Friend,
    /// Each order belongs to one cycle
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id",
        on_delete = "Cascade"
    )]
    Cycle,
    /// Optional pickup location reference
    #[sea_orm(
        belongs_to = "super::pickup_location::Entity",
        from = "Column::PickupLocationId",
        to = "super::pickup_location::Column::Id",
        on_delete = "SetNull"
    )]
    PickupLocation,
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::friend::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Friend.def()
    }
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
    }
}

impl Related<super::pickup_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupLocation.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
