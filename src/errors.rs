//! Unified error types and result handling.
//!
//! Every business-rule violation is detected synchronously before any write
//! and surfaces as a structured [`Error`] with a coarse [`ErrorKind`] and a
//! human-readable message. Database, I/O, and environment errors convert via
//! `#[from]`.

use thiserror::Error;

/// Coarse classification of an [`Error`], used by boundary layers to map
/// failures onto their own status codes without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced friend, cycle, order, product, or transaction is missing.
    NotFound,
    /// A required field is missing or a supplied value is malformed.
    ValidationFailed,
    /// The cycle is locked or completed and rejects order mutation.
    Locked,
    /// Missing/wrong credential, or an attempt to touch an immutable entry.
    PermissionDenied,
    /// The entity exists but is in a state that forbids the operation.
    PreconditionFailed,
    /// Infrastructure failure (database, I/O, configuration).
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Friend {id} not found")]
    FriendNotFound { id: i64 },

    #[error("Cycle {id} not found")]
    CycleNotFound { id: i64 },

    #[error("Product {id} not found")]
    ProductNotFound { id: i64 },

    #[error("Pickup location {id} not found")]
    PickupLocationNotFound { id: i64 },

    #[error("Order {id} not found")]
    OrderNotFound { id: i64 },

    #[error("No order exists for friend {friend_id} in cycle {cycle_id}")]
    DraftNotFound { friend_id: i64, cycle_id: i64 },

    #[error("Transaction {id} not found")]
    TransactionNotFound { id: i64 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Cycle {id} is {status} and does not accept order changes")]
    CycleLocked { id: i64, status: String },

    #[error("Order {order_id} has no items")]
    EmptyOrder { order_id: i64 },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Maps the variant onto the coarse taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FriendNotFound { .. }
            | Self::CycleNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::PickupLocationNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::DraftNotFound { .. }
            | Self::TransactionNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidAmount { .. } | Self::Validation { .. } | Self::EmptyOrder { .. } => {
                ErrorKind::ValidationFailed
            }
            Self::CycleLocked { .. } => ErrorKind::Locked,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Precondition { .. } => ErrorKind::PreconditionFailed,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
