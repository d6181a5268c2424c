//! Database connection and schema creation using `SeaORM`.
//!
//! Tables are generated straight from the entity definitions via
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{
    Cycle, Friend, Order, OrderItem, PickupLocation, Product, ProductVariant, Transaction,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Parent tables come first so the generated foreign keys resolve.
///
/// # Errors
/// Returns an error if a table creation statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let cycle_table = schema.create_table_from_entity(Cycle);
    let friend_table = schema.create_table_from_entity(Friend);
    let pickup_location_table = schema.create_table_from_entity(PickupLocation);
    let product_table = schema.create_table_from_entity(Product);
    let product_variant_table = schema.create_table_from_entity(ProductVariant);
    let order_table = schema.create_table_from_entity(Order);
    let order_item_table = schema.create_table_from_entity(OrderItem);
    let transaction_table = schema.create_table_from_entity(Transaction);

    db.execute(builder.build(&cycle_table)).await?;
    db.execute(builder.build(&friend_table)).await?;
    db.execute(builder.build(&pickup_location_table)).await?;
    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&product_variant_table)).await?;
    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&order_item_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    Ok(())
}
