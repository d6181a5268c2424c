//! Pickup location business logic.
//!
//! Locations referenced by an order are never hard-deleted; the delete path
//! deactivates them instead, so historical orders keep a resolvable pickup
//! reference.

use crate::{
    entities::{Order, PickupLocation, order, pickup_location},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Explicit partial update for a pickup location.
#[derive(Debug, Default, Clone)]
pub struct PickupLocationUpdate {
    /// New location name
    pub name: Option<String>,
    /// New address text (`Some(None)` clears it)
    pub address: Option<Option<String>>,
    /// Show / hide on the order form
    pub active: Option<bool>,
}

/// Lists pickup locations ordered by name. `include_inactive` is the admin
/// view; the order form only shows active ones.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_locations(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<pickup_location::Model>> {
    let mut query = PickupLocation::find();
    if !include_inactive {
        query = query.filter(pickup_location::Column::Active.eq(true));
    }
    query
        .order_by_asc(pickup_location::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active pickup location.
///
/// # Errors
/// Returns an error if the name is empty.
pub async fn create_location(
    db: &DatabaseConnection,
    name: &str,
    address: Option<String>,
) -> Result<pickup_location::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "pickup location name cannot be empty".to_string(),
        });
    }

    let model = pickup_location::ActiveModel {
        name: Set(name.trim().to_string()),
        address: Set(address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty())),
        active: Set(true),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Applies a partial update to a pickup location.
///
/// # Errors
/// Returns an error if the location does not exist or the new name is empty.
pub async fn update_location(
    db: &DatabaseConnection,
    location_id: i64,
    update: PickupLocationUpdate,
) -> Result<pickup_location::Model> {
    let existing = PickupLocation::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or(Error::PickupLocationNotFound { id: location_id })?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "pickup location name cannot be empty".to_string(),
            });
        }
    }

    let mut model: pickup_location::ActiveModel = existing.into();
    if let Some(name) = update.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(address) = update.address {
        model.address = Set(address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()));
    }
    if let Some(active) = update.active {
        model.active = Set(active);
    }

    model.update(db).await.map_err(Into::into)
}

/// Deletes a pickup location, or deactivates it when orders reference it.
///
/// # Errors
/// Returns an error if the location does not exist.
pub async fn delete_location(db: &DatabaseConnection, location_id: i64) -> Result<()> {
    let existing = PickupLocation::find_by_id(location_id)
        .one(db)
        .await?
        .ok_or(Error::PickupLocationNotFound { id: location_id })?;

    let referenced = Order::find()
        .filter(order::Column::PickupLocationId.eq(location_id))
        .count(db)
        .await?;

    if referenced > 0 {
        let mut model: pickup_location::ActiveModel = existing.into();
        model.active = Set(false);
        model.update(db).await?;
        tracing::info!(location_id, referenced, "pickup location deactivated");
    } else {
        existing.delete(db).await?;
        tracing::info!(location_id, "pickup location deleted");
    }
    Ok(())
}
