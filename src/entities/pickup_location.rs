//! Pickup location entity - Where friends collect their packed orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pickup location database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pickup_locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location name shown on the order form
    pub name: String,
    /// Optional street address or pickup instructions
    pub address: Option<String>,
    /// Soft-disable flag; inactive locations are hidden from friends
    pub active: bool,
}

/// Defines relationships between PickupLocation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One location may be chosen by many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
