//! Fixed-window request counter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counter for one throttled key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    pub key: String,
    /// Requests seen in the current window, including the one being checked
    pub count: u32,
    pub limit: u32,
    pub window_reset_at: DateTime<Utc>,
}

impl RateLimitCounter {
    /// First hit of a fresh window
    pub fn start(key: impl Into<String>, limit: u32, window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            count: 1,
            limit,
            window_reset_at: now + window,
        }
    }

    /// Count one more hit, opening a new window once `now` is past the reset instant
    pub fn hit(&mut self, limit: u32, window: Duration, now: DateTime<Utc>) {
        if now > self.window_reset_at {
            self.count = 0;
            self.window_reset_at = now + window;
        }
        self.count = self.count.saturating_add(1);
        self.limit = limit;
    }

    pub fn is_allowed(&self) -> bool {
        self.count <= self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.window_reset_at
    }
}
