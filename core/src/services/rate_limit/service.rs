//! Rate limiter over a pluggable counter store

use chrono::Duration;
use std::sync::Arc;
use tracing::warn;

use sw_shared::config::{RateLimitConfig, WindowLimit, MAX_WINDOW_SECONDS};

use crate::errors::StorageResult;
use crate::repositories::RateLimitStore;
use crate::services::clock::Clock;

use super::types::{RateLimitDecision, RouteClass};

/// Fixed-window rate limiter
pub struct RateLimiter<S: RateLimitStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    routes: RateLimitConfig,
}

impl<S: RateLimitStore> RateLimiter<S> {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `store` - Counter store (in-memory or Redis)
    /// * `clock` - Time source
    /// * `routes` - Per route class ceilings used by `check_route`
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, routes: RateLimitConfig) -> Self {
        Self {
            store,
            clock,
            routes,
        }
    }

    /// Count one request against `key` and decide whether it may proceed
    ///
    /// The increment and the comparison happen in a single store operation,
    /// so concurrent callers can never jointly exceed `limit`.
    pub async fn check(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> StorageResult<RateLimitDecision> {
        let now = self.clock.now();
        let counter = self.store.hit(key, limit, window, now).await?;
        let decision = RateLimitDecision::from(&counter);

        if !decision.allowed {
            warn!(
                key = key,
                count = counter.count,
                limit = limit,
                reset_at = %decision.reset_at,
                event = "rate_limit_exceeded",
                "Rate limit exceeded"
            );
        }

        Ok(decision)
    }

    /// Check a window limit from configuration
    ///
    /// Windows longer than `MAX_WINDOW_SECONDS` are shortened to it.
    pub async fn check_limit(&self, key: &str, limit: WindowLimit) -> StorageResult<RateLimitDecision> {
        let window_seconds = limit.window_seconds.min(MAX_WINDOW_SECONDS) as i64;
        self.check(key, limit.limit, Duration::seconds(window_seconds))
            .await
    }

    /// Check a request from `origin` against the ceiling of its route class
    pub async fn check_route(&self, class: RouteClass, origin: &str) -> StorageResult<RateLimitDecision> {
        let key = format!("route:{}:{}", class, origin);
        self.check_limit(&key, self.limit_for(class)).await
    }

    /// Configured ceiling for a route class
    pub fn limit_for(&self, class: RouteClass) -> WindowLimit {
        match class {
            RouteClass::Auth => self.routes.auth,
            RouteClass::Api => self.routes.api,
            RouteClass::Webhook => self.routes.webhook,
        }
    }

    /// Whether origin throttling is switched on
    pub fn is_enabled(&self) -> bool {
        self.routes.enabled
    }

    /// Drop finished windows from stores without native expiry
    pub async fn purge_expired(&self) -> StorageResult<u64> {
        self.store.purge_expired(self.clock.now()).await
    }
}
