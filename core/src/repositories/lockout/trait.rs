//! Lockout repository trait defining per-identity throttle state persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::LockoutState;
use crate::domain::value_objects::Identity;
use crate::errors::StorageResult;

/// Repository trait for LockoutState persistence
///
/// One state per identity, shared by issuance and verification of every purpose.
#[async_trait]
pub trait LockoutRepository: Send + Sync {
    /// Load the current state for an identity
    async fn load(&self, identity: &Identity) -> StorageResult<Option<LockoutState>>;

    /// Atomically read-modify-write the state for an identity
    ///
    /// `transition` receives the current state (or `None`) and returns the new
    /// state; returning `None` deletes the entry. No other update for the same
    /// identity may interleave.
    ///
    /// # Returns
    /// The state written by `transition`
    async fn update<F>(&self, identity: &Identity, transition: F) -> StorageResult<Option<LockoutState>>
    where
        F: FnOnce(Option<LockoutState>) -> Option<LockoutState> + Send + 'static;

    /// Remove all state for an identity
    ///
    /// # Returns
    /// `true` if an entry existed
    async fn clear(&self, identity: &Identity) -> StorageResult<bool>;

    /// Delete unlocked entries with no attempt inside the retention horizon
    ///
    /// # Returns
    /// Number of entries removed
    async fn purge_stale(&self, now: DateTime<Utc>, retention: Duration) -> StorageResult<u64>;
}
