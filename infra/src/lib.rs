//! # Infrastructure Layer
//!
//! Concrete adapters for the storage and collaborator ports defined in
//! `sw_core`:
//!
//! - **Database**: MySQL repositories for verification codes and lockout state (SQLx)
//! - **Cache**: Redis client and the fixed-window rate counter store
//! - **Delivery**: log sink and HTTP relay for issued codes, plus a no-op
//!   account confirmation
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use sw_core::StorageError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and rate counters
pub mod cache;

/// Delivery module - code delivery and confirmation adapters
pub mod delivery;

pub use cache::{RedisClient, RedisRateLimitStore};
#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlLockoutRepository, MySqlVerificationCodeRepository};
pub use delivery::{ConfiguredDelivery, LogDelivery, NoopConfirmation, WebhookDelivery};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Delivery relay rejected a message
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Row or cache value could not be mapped back to a domain record
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl InfrastructureError {
    /// Whether the backend itself is unreachable, as opposed to a failed statement
    pub fn is_connectivity(&self) -> bool {
        match self {
            InfrastructureError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            InfrastructureError::Cache(e) => {
                e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
            }
            InfrastructureError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

impl From<InfrastructureError> for StorageError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Malformed(message) => StorageError::corrupt(message),
            ref e if e.is_connectivity() => StorageError::unavailable(e.to_string()),
            e => StorageError::operation(e.to_string()),
        }
    }
}
