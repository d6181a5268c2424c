//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cycle;
pub mod friend;
pub mod order;
pub mod order_item;
pub mod pickup_location;
pub mod product;
pub mod product_variant;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use cycle::{Column as CycleColumn, Entity as Cycle, Model as CycleModel};
pub use friend::{Column as FriendColumn, Entity as Friend, Model as FriendModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use pickup_location::{
    Column as PickupLocationColumn, Entity as PickupLocation, Model as PickupLocationModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_variant::{
    Column as ProductVariantColumn, Entity as ProductVariant, Model as ProductVariantModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
