//! Types for rate limit decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entities::RateLimitCounter;
use crate::services::clock::seconds_until;

/// Outcome of one rate limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    pub limit: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

impl From<&RateLimitCounter> for RateLimitDecision {
    fn from(counter: &RateLimitCounter) -> Self {
        Self {
            allowed: counter.is_allowed(),
            remaining: counter.remaining(),
            limit: counter.limit,
            reset_at: counter.window_reset_at,
        }
    }
}

impl RateLimitDecision {
    /// Seconds until the window resets, at least 1
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> i64 {
        seconds_until(self.reset_at, now)
    }
}

/// Route families throttled per origin address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteClass {
    /// Code issuance and verification endpoints
    Auth,
    /// Everything else under the API prefix
    Api,
    /// Inbound provider callbacks
    Webhook,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Auth => "auth",
            RouteClass::Api => "api",
            RouteClass::Webhook => "webhook",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
