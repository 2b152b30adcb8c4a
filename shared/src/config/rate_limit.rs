//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// Longest fixed window accepted (one year)
pub const MAX_WINDOW_SECONDS: u64 = 60 * 60 * 24 * 365;

/// A fixed-window ceiling: `limit` requests per `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowLimit {
    /// Requests allowed per window
    pub limit: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl WindowLimit {
    pub const fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            limit,
            window_seconds,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable per-origin route throttling
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Authentication routes (send-code, verify-code) per origin address
    #[serde(default = "default_auth_limit")]
    pub auth: WindowLimit,

    /// General API routes per origin address
    #[serde(default = "default_api_limit")]
    pub api: WindowLimit,

    /// Webhook receivers per origin address
    #[serde(default = "default_webhook_limit")]
    pub webhook: WindowLimit,

    /// Code issuance per (purpose, identity)
    #[serde(default = "default_issuance_limit")]
    pub issuance: WindowLimit,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            auth: default_auth_limit(),
            api: default_api_limit(),
            webhook: default_webhook_limit(),
            issuance: default_issuance_limit(),
        }
    }
}

impl RateLimitConfig {
    /// Create a development configuration (more lenient route limits)
    pub fn development() -> Self {
        Self {
            auth: WindowLimit::new(50, 900),
            api: WindowLimit::new(600, 60),
            ..Default::default()
        }
    }

    /// Create a production configuration (stricter limits)
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_auth_limit() -> WindowLimit {
    WindowLimit::new(5, 900) // 5 per 15 minutes
}

fn default_api_limit() -> WindowLimit {
    WindowLimit::new(120, 60)
}

fn default_webhook_limit() -> WindowLimit {
    WindowLimit::new(30, 60)
}

fn default_issuance_limit() -> WindowLimit {
    WindowLimit::new(5, 900)
}
