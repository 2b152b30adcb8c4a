//! Periodic purge of spent codes, idle lockout entries and finished rate windows

use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

use sw_shared::config::{CleanupConfig, MAX_POLICY_MINUTES};

use crate::repositories::{LockoutRepository, RateLimitStore, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::lockout::IdentityLockoutTracker;
use crate::services::rate_limit::RateLimiter;

/// Service for removing records that no longer affect any decision
pub struct CleanupService<C, L, S>
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
{
    codes: Arc<C>,
    tracker: Arc<IdentityLockoutTracker<L>>,
    limiter: Arc<RateLimiter<S>>,
    clock: Arc<dyn Clock>,
    config: CleanupConfig,
}

impl<C, L, S> CleanupService<C, L, S>
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
{
    pub fn new(
        codes: Arc<C>,
        tracker: Arc<IdentityLockoutTracker<L>>,
        limiter: Arc<RateLimiter<S>>,
        clock: Arc<dyn Clock>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            codes,
            tracker,
            limiter,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Each step runs even if an earlier one failed; failures are collected
    /// in `CleanupResult::errors`.
    pub async fn run_cleanup(&self) -> CleanupResult {
        let mut result = CleanupResult::default();
        if !self.config.enabled {
            return result;
        }

        let grace_hours = self.config.grace_hours.clamp(0, MAX_POLICY_MINUTES / 60);
        let cutoff = self.clock.now() - Duration::hours(grace_hours);
        match self.codes.purge(cutoff).await {
            Ok(count) => result.codes_removed = count,
            Err(e) => {
                error!(error = %e, event = "cleanup_failed", "Failed to purge verification codes");
                result.errors.push(format!("Code cleanup error: {}", e));
            }
        }

        match self.tracker.purge_stale().await {
            Ok(count) => result.lockouts_removed = count,
            Err(e) => {
                error!(error = %e, event = "cleanup_failed", "Failed to purge lockout state");
                result.errors.push(format!("Lockout cleanup error: {}", e));
            }
        }

        match self.limiter.purge_expired().await {
            Ok(count) => result.counters_removed = count,
            Err(e) => {
                error!(error = %e, event = "cleanup_failed", "Failed to purge rate counters");
                result.errors.push(format!("Rate counter cleanup error: {}", e));
            }
        }

        info!(
            codes = result.codes_removed,
            lockouts = result.lockouts_removed,
            counters = result.counters_removed,
            event = "cleanup_completed",
            "Cleanup cycle completed"
        );

        result
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs a cycle every `interval_seconds`.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);
        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Cleanup service started"
            );
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "Cleanup completed with errors");
                }
            }
        }))
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    pub codes_removed: u64,
    pub lockouts_removed: u64,
    pub counters_removed: u64,
    /// Errors encountered, one per failed step
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> u64 {
        self.codes_removed + self.lockouts_removed + self.counters_removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LockoutPolicy, VerificationCode};
    use crate::domain::value_objects::{Identity, Purpose};
    use crate::repositories::{
        InMemoryLockoutRepository, InMemoryRateLimitStore, InMemoryVerificationCodeRepository,
    };
    use crate::services::clock::ManualClock;
    use chrono::Utc;
    use sw_shared::config::RateLimitConfig;

    #[tokio::test]
    async fn test_cleanup_purges_all_stores() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codes = Arc::new(InMemoryVerificationCodeRepository::new());
        let tracker = Arc::new(IdentityLockoutTracker::new(
            Arc::new(InMemoryLockoutRepository::new()),
            clock.clone(),
            LockoutPolicy::default(),
        ));
        let limiter = Arc::new(RateLimiter::new(
            Arc::new(InMemoryRateLimitStore::new()),
            clock.clone(),
            RateLimitConfig::default(),
        ));

        let identity = Identity::parse("gina@example.com").unwrap();
        codes
            .replace_active(VerificationCode::new(
                identity.clone(),
                Purpose::Signup,
                "aa".repeat(32),
                "bb".repeat(16),
                3,
                clock.now(),
                Duration::minutes(15),
            ))
            .await
            .unwrap();
        tracker.record_outcome(&identity, false).await.unwrap();
        limiter.check("k", 5, Duration::minutes(1)).await.unwrap();

        let service = CleanupService::new(
            codes.clone(),
            tracker,
            limiter,
            clock.clone(),
            CleanupConfig::default(),
        );

        assert_eq!(service.run_cleanup().await.total_cleaned(), 0);

        clock.advance(Duration::hours(48));
        let result = service.run_cleanup().await;
        assert!(result.is_success());
        assert_eq!(result.codes_removed, 1);
        assert_eq!(result.lockouts_removed, 1);
        assert_eq!(result.counters_removed, 1);
        assert!(codes.is_empty().await);
    }

    #[tokio::test]
    async fn test_disabled_cleanup_does_nothing() {
        let clock = Arc::new(ManualClock::default());
        let service = CleanupService::new(
            Arc::new(InMemoryVerificationCodeRepository::new()),
            Arc::new(IdentityLockoutTracker::new(
                Arc::new(InMemoryLockoutRepository::new()),
                clock.clone(),
                LockoutPolicy::default(),
            )),
            Arc::new(RateLimiter::new(
                Arc::new(InMemoryRateLimitStore::new()),
                clock.clone(),
                RateLimitConfig::default(),
            )),
            clock,
            CleanupConfig {
                enabled: false,
                ..Default::default()
            },
        );
        assert_eq!(service.run_cleanup().await, CleanupResult::default());
    }

    #[tokio::test]
    async fn test_oversized_grace_is_capped() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codes = Arc::new(InMemoryVerificationCodeRepository::new());
        codes
            .replace_active(VerificationCode::new(
                Identity::parse("hugo@example.com").unwrap(),
                Purpose::Signup,
                "aa".repeat(32),
                "bb".repeat(16),
                3,
                clock.now(),
                Duration::minutes(15),
            ))
            .await
            .unwrap();

        let service = CleanupService::new(
            codes.clone(),
            Arc::new(IdentityLockoutTracker::new(
                Arc::new(InMemoryLockoutRepository::new()),
                clock.clone(),
                LockoutPolicy::default(),
            )),
            Arc::new(RateLimiter::new(
                Arc::new(InMemoryRateLimitStore::new()),
                clock.clone(),
                RateLimitConfig::default(),
            )),
            clock.clone(),
            CleanupConfig {
                grace_hours: i64::MAX,
                ..Default::default()
            },
        );

        clock.advance(Duration::hours(48));
        let result = service.run_cleanup().await;
        assert!(result.is_success());
        assert_eq!(result.codes_removed, 0);
        assert!(!codes.is_empty().await);
    }
}
