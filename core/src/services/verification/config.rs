//! Configuration for code issuance and verification

use sw_shared::config::{AppConfig, VerificationConfig, WindowLimit};

/// Issuance policy
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Code shape, lifetime and per-code attempt ceiling
    pub code: VerificationConfig,
    /// Ceiling on issuances per (purpose, identity)
    pub issuance_limit: WindowLimit,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code: VerificationConfig::default(),
            issuance_limit: WindowLimit::new(5, 900),
        }
    }
}

impl From<&AppConfig> for VerificationServiceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            code: config.verification.clone(),
            issuance_limit: config.rate_limit.issuance,
        }
    }
}
