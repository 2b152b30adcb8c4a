//! Domain-specific error types and error handling.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::services::clock::seconds_until;

/// Failures of a storage port (code, lockout or rate-counter store)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("Storage operation failed: {message}")]
    Operation { message: String },

    #[error("Stored record is malformed: {message}")]
    Corrupt { message: String },
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Core domain errors
///
/// The three throttling variants carry the instant after which a retry may
/// succeed. They deliberately share one user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Issuance counter for the (purpose, identity) pair is over its ceiling
    #[error("Too many attempts, try later")]
    RateLimitExceeded { reset_at: DateTime<Utc> },

    /// Identity produced too many failures inside the failure window
    #[error("Too many attempts, try later")]
    RateLimited { next_allowed_at: DateTime<Utc> },

    /// Identity is temporarily locked
    #[error("Too many attempts, try later")]
    Locked { until: DateTime<Utc> },

    #[error("Code delivery failed: {message}")]
    Delivery { message: String },

    #[error("Account confirmation failed: {message}")]
    Confirmation { message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Instant after which a throttled caller may retry
    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        match self {
            DomainError::RateLimitExceeded { reset_at } => Some(*reset_at),
            DomainError::RateLimited { next_allowed_at } => Some(*next_allowed_at),
            DomainError::Locked { until } => Some(*until),
            _ => None,
        }
    }

    /// Whole seconds until retry (at least 1) for throttling errors
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.retry_at().map(|at| seconds_until(at, now))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
