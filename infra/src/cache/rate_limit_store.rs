//! Redis-backed fixed-window counters
//!
//! Each key holds a plain integer whose expiry marks the end of its window.
//! Increment and expiry run in one Lua script so concurrent hits from several
//! API instances count exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::Script;
use std::sync::Arc;
use tracing::debug;

use sw_core::{RateLimitCounter, RateLimitStore, StorageResult};

use crate::cache::redis_client::RedisClient;
use crate::InfrastructureError;

// Returns {count, remaining window in ms}. A key that somehow lost its expiry
// gets one on the next hit instead of counting forever.
const HIT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('PTTL', KEYS[1])
if count == 1 or ttl < 0 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// `RateLimitStore` on Redis
pub struct RedisRateLimitStore {
    client: Arc<RedisClient>,
    script: Script,
}

impl RedisRateLimitStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            script: Script::new(HIT_SCRIPT),
        }
    }

    fn storage_key(&self, key: &str) -> String {
        self.client.make_key(&format!("rate_limit:{}", key))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<RateLimitCounter> {
        let window_ms = window.num_milliseconds().max(1);
        let mut conn = self.client.connection();

        let (count, ttl_ms): (i64, i64) = self
            .script
            .key(self.storage_key(key))
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        let counter = counter_from_reply(key, limit, count, ttl_ms, now);
        debug!(key = %key, count = counter.count, limit, "Rate counter hit");
        Ok(counter)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> StorageResult<u64> {
        // Keys expire natively
        Ok(0)
    }
}

/// Build the domain counter from the script reply
pub(crate) fn counter_from_reply(
    key: &str,
    limit: u32,
    count: i64,
    ttl_ms: i64,
    now: DateTime<Utc>,
) -> RateLimitCounter {
    RateLimitCounter {
        key: key.to_string(),
        count: u32::try_from(count.max(0)).unwrap_or(u32::MAX),
        limit,
        window_reset_at: now + Duration::milliseconds(ttl_ms.max(0)),
    }
}
