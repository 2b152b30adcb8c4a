//! Storage backend and maintenance configuration

use serde::{Deserialize, Serialize};

/// Where codes, lockout state and rate counters live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps; state is lost on restart
    #[default]
    Memory,
    /// MySQL for codes and lockouts, Redis for rate counters
    Durable,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Periodic purge of spent records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between cleanup runs
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Hours an expired or consumed code is kept before purging
    #[serde(default = "default_grace_hours")]
    pub grace_hours: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            grace_hours: default_grace_hours(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    3600
}

fn default_grace_hours() -> i64 {
    24
}
