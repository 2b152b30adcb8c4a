//! Verification code and identity lockout policy configuration

use serde::{Deserialize, Serialize};

/// Characters a verification code is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeCharset {
    /// Decimal digits only
    #[default]
    Numeric,
    /// Upper-case letters and digits without look-alikes (0/O, 1/I)
    Alphanumeric,
}

impl CodeCharset {
    /// The alphabet codes are sampled from
    pub fn alphabet(&self) -> &'static [u8] {
        match self {
            CodeCharset::Numeric => b"0123456789",
            CodeCharset::Alphanumeric => b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789",
        }
    }
}

/// Shortest code the service will issue or accept
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code the service will issue or accept
pub const MAX_CODE_LENGTH: usize = 12;

/// Ceiling for minute-granular policy durations (one year)
pub const MAX_POLICY_MINUTES: i64 = 60 * 24 * 365;

/// Verification code policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Number of characters in a code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Alphabet codes are drawn from
    #[serde(default)]
    pub charset: CodeCharset,

    /// Minutes until an issued code expires
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Failed comparisons allowed against a single code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Random salt length in bytes
    #[serde(default = "default_salt_bytes")]
    pub salt_bytes: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            charset: CodeCharset::default(),
            ttl_minutes: default_ttl_minutes(),
            max_attempts: default_max_attempts(),
            salt_bytes: default_salt_bytes(),
        }
    }
}

/// Identity lockout policy shared by issuance and verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Consecutive failures that trigger a lockout
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Lockout length in minutes
    #[serde(default = "default_lockout_duration_minutes")]
    pub lockout_duration_minutes: i64,

    /// Failure rate window in minutes
    #[serde(default = "default_rate_limit_window_minutes")]
    pub rate_limit_window_minutes: i64,

    /// Failures tolerated inside one rate window
    #[serde(default = "default_rate_limit_max_attempts")]
    pub rate_limit_max_attempts: u32,

    /// Hours of inactivity after which lockout state may be purged
    #[serde(default = "default_retention_hours")]
    pub retention_hours: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            lockout_duration_minutes: default_lockout_duration_minutes(),
            rate_limit_window_minutes: default_rate_limit_window_minutes(),
            rate_limit_max_attempts: default_rate_limit_max_attempts(),
            retention_hours: default_retention_hours(),
        }
    }
}

fn default_code_length() -> usize {
    6
}

fn default_ttl_minutes() -> i64 {
    15
}

fn default_max_attempts() -> u32 {
    3
}

fn default_salt_bytes() -> usize {
    16
}

// Kept above the per-code ceiling so an exhausted code is still reported as such
// before the identity itself is locked.
fn default_max_failures() -> u32 {
    5
}

fn default_lockout_duration_minutes() -> i64 {
    15
}

fn default_rate_limit_window_minutes() -> i64 {
    5
}

fn default_rate_limit_max_attempts() -> u32 {
    5
}

fn default_retention_hours() -> i64 {
    24
}
