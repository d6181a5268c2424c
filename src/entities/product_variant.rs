//! Product variant entity - One priced pack size of a product.
//!
//! The (product, variant label) pair maps to a base unit price before the
//! cycle markup is applied. Absence of a row means the variant is not
//! orderable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product variant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    /// Unique identifier for the variant row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this variant belongs to
    pub product_id: i64,
    /// Variant label (e.g. "150g", "250g", "1kg")
    pub variant: String,
    /// Base unit price before cycle markup, 2 decimal places
    pub base_price: f64,
}

/// Defines relationships between ProductVariant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each variant belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
