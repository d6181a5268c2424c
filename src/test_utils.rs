//! Shared test utilities for `OrderBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{cart, catalog, cycle, friend},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an open test cycle with the default pass-through markup.
pub async fn create_test_cycle(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::cycle::Model> {
    cycle::create_cycle(db, name).await
}

/// Creates a test cycle with a specific status and markup ratio.
/// Use this when a test needs a locked/completed cycle or a non-trivial
/// markup.
pub async fn create_custom_cycle(
    db: &DatabaseConnection,
    name: &str,
    status: entities::cycle::CycleStatus,
    markup_ratio: f64,
) -> Result<entities::cycle::Model> {
    let created = cycle::create_cycle(db, name).await?;
    cycle::update_cycle(
        db,
        created.id,
        cycle::CycleUpdate {
            status: Some(status),
            markup_ratio: Some(markup_ratio),
            ..Default::default()
        },
    )
    .await
}

/// Creates an active test friend.
pub async fn create_test_friend(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::friend::Model> {
    friend::create_friend(db, name).await
}

/// Creates a test product with the standard two variants.
///
/// # Defaults
/// * `250g`: 8.00
/// * `1kg`: 30.00
pub async fn create_test_product(
    db: &DatabaseConnection,
    cycle_id: i64,
    name: &str,
) -> Result<entities::product::Model> {
    create_custom_product(
        db,
        cycle_id,
        name,
        BTreeMap::from([("250g".to_string(), 8.0), ("1kg".to_string(), 30.0)]),
    )
    .await
}

/// Creates a test product with a custom variant price table.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    cycle_id: i64,
    name: &str,
    prices: BTreeMap<String, f64>,
) -> Result<entities::product::Model> {
    catalog::create_product(
        db,
        cycle_id,
        catalog::NewProduct {
            name: name.to_string(),
            prices,
            ..Default::default()
        },
    )
    .await
}

/// Sets up a complete test environment with one friend.
/// Returns (db, friend) for ledger-focused tests.
pub async fn setup_with_friend() -> Result<(DatabaseConnection, entities::friend::Model)> {
    let db = setup_test_db().await?;
    let friend = create_test_friend(&db, "anna").await?;
    Ok((db, friend))
}

/// Fills the pair's cart with one 250g unit of the product and submits it.
/// Returns the submitted order.
pub async fn submit_test_order(
    db: &DatabaseConnection,
    friend_id: i64,
    cycle_id: i64,
    product_id: i64,
) -> Result<entities::order::Model> {
    cart::replace_cart(
        db,
        friend_id,
        cycle_id,
        &[cart::CartItem {
            product_id,
            variant: "250g".to_string(),
            quantity: 1,
        }],
    )
    .await?;
    cart::submit(db, friend_id, cycle_id).await
}
