//! Product entity - A catalog entry scoped to one cycle.
//!
//! Prices live in the `product_variant` child table (one row per variant
//! label); a product with no row for a variant is simply unavailable in that
//! variant. Products are soft-deleted via the `active` flag so historical
//! order items keep a valid reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Cycle this product belongs to
    pub cycle_id: i64,
    /// Product name
    pub name: String,
    /// First description line (origin, processing)
    pub description1: Option<String>,
    /// Second description line (flavor profile)
    pub description2: Option<String>,
    /// Roast level (e.g. "Light roast")
    pub roast_type: Option<String>,
    /// Intended use (e.g. "Filter", "Espresso")
    pub purpose: Option<String>,
    /// Product image as a data URL, supplied by the upload boundary
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    /// Soft delete flag - if false, product is hidden but data is preserved
    pub active: bool,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one cycle
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id",
        on_delete = "Cascade"
    )]
    Cycle,
    /// One product has many priced variants
    #[sea_orm(has_many = "super::product_variant::Entity")]
    Variants,
    /// One product appears in many order items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
    }
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
