//! Rate-limit counter store trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::RateLimitCounter;
use crate::errors::StorageResult;

/// Store for fixed-window counters
///
/// Counters are ephemeral; losing them only relaxes throttling.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Atomically count one hit against `key`
    ///
    /// If `now` is past the stored reset instant the window restarts at `now`.
    ///
    /// # Returns
    /// The counter after the increment
    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<RateLimitCounter>;

    /// Drop counters whose window has ended
    ///
    /// # Returns
    /// Number of counters removed (stores with native expiry return 0)
    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<u64>;
}
