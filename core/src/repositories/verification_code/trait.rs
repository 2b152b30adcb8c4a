//! Verification code repository trait defining the persistence contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::StorageResult;

/// Repository trait for VerificationCode persistence operations
///
/// Every mutating method must be atomic with respect to concurrent callers.
/// The verifier relies on `increment_attempts` and `consume` being conditional
/// single-record updates to guarantee at-most-once consumption.
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Store a new code, invalidating any unconsumed code for the same pair
    ///
    /// Deletion of the previous record and insertion of the new one happen
    /// atomically, so at most one unconsumed record exists per
    /// (identity, purpose) at any instant.
    ///
    /// # Arguments
    /// * `code` - The freshly issued record (`attempts = 0`, not consumed)
    async fn replace_active(&self, code: VerificationCode) -> StorageResult<()>;

    /// Find the unconsumed record for (identity, purpose)
    ///
    /// Expired and exhausted records are still returned so the caller can
    /// report why verification failed.
    ///
    /// # Returns
    /// * `Ok(Some(code))` - The live record
    /// * `Ok(None)` - No unconsumed record exists
    async fn find_active(
        &self,
        identity: &Identity,
        purpose: Purpose,
    ) -> StorageResult<Option<VerificationCode>>;

    /// Atomically add one failed attempt to an unconsumed record
    ///
    /// # Returns
    /// * `Ok(Some(attempts))` - Attempt count after the increment
    /// * `Ok(None)` - The record is gone or was consumed meanwhile
    async fn increment_attempts(&self, id: Uuid) -> StorageResult<Option<u32>>;

    /// Compare-and-set `consumed_at`
    ///
    /// Succeeds only if the record exists, `consumed_at` is still null and
    /// `attempts < max_attempts`.
    ///
    /// # Returns
    /// * `Ok(true)` - This caller consumed the record
    /// * `Ok(false)` - Another caller won, or the record is gone or exhausted
    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> StorageResult<bool>;

    /// Delete records that expired or were consumed before `before`
    ///
    /// # Returns
    /// Number of records removed
    async fn purge(&self, before: DateTime<Utc>) -> StorageResult<u64>;
}
