//! Per-identity failure tracking and temporary lockout.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use sw_shared::config::{LockoutConfig, MAX_POLICY_MINUTES};

use crate::domain::value_objects::Identity;

/// Thresholds governing lockout transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Consecutive failures that start a lockout
    pub max_failures: u32,
    pub lockout_duration: Duration,
    /// Length of the failure rate window
    pub window: Duration,
    /// Failures tolerated per window before `RateLimited`
    pub window_max_failures: u32,
    /// Inactivity after which an unlocked entry may be purged
    pub retention: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::from(&LockoutConfig::default())
    }
}

/// Durations outside `0..=MAX_POLICY_MINUTES` are clamped into it
impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self {
            max_failures: config.max_failures,
            lockout_duration: bounded_minutes(config.lockout_duration_minutes),
            window: bounded_minutes(config.rate_limit_window_minutes),
            window_max_failures: config.rate_limit_max_attempts,
            retention: bounded_minutes(config.retention_hours.saturating_mul(60)),
        }
    }
}

fn bounded_minutes(minutes: i64) -> Duration {
    Duration::minutes(minutes.clamp(0, MAX_POLICY_MINUTES))
}

/// Failure state for one identity, shared by every purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutState {
    pub identity: Identity,

    /// Consecutive failures since the last success or lockout
    pub failure_count: u32,

    pub last_attempt_at: DateTime<Utc>,

    pub lockout_until: Option<DateTime<Utc>>,

    /// First failure of the current rate window
    pub window_started_at: Option<DateTime<Utc>>,

    /// Failures recorded inside the current rate window
    pub window_failures: u32,
}

impl LockoutState {
    pub fn new(identity: Identity, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            failure_count: 0,
            last_attempt_at: now,
            lockout_until: None,
            window_started_at: None,
            window_failures: 0,
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.map_or(false, |until| now < until)
    }

    /// End of the current rate window, if one is open at `now`
    pub fn window_ends_at(&self, now: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
        self.window_started_at
            .map(|start| start + window)
            .filter(|end| now < *end)
    }

    /// Failures counted in the rate window open at `now`
    pub fn window_failures_at(&self, now: DateTime<Utc>, window: Duration) -> u32 {
        match self.window_ends_at(now, window) {
            Some(_) => self.window_failures,
            None => 0,
        }
    }

    /// Apply one failed attempt
    ///
    /// Returns `true` when this failure started a lockout. Reaching
    /// `max_failures` resets the consecutive counter so the identity gets a
    /// fresh allowance once the lockout passes.
    pub fn register_failure(&mut self, now: DateTime<Utc>, policy: &LockoutPolicy) -> bool {
        if self.window_ends_at(now, policy.window).is_some() {
            self.window_failures += 1;
        } else {
            self.window_started_at = Some(now);
            self.window_failures = 1;
        }

        self.failure_count += 1;
        self.last_attempt_at = now;

        if self.failure_count >= policy.max_failures {
            self.lockout_until = Some(now + policy.lockout_duration);
            self.failure_count = 0;
            true
        } else {
            false
        }
    }

    /// Entry carries nothing worth keeping at `now`
    pub fn is_stale_at(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        !self.is_locked_at(now) && self.last_attempt_at + retention <= now
    }
}
