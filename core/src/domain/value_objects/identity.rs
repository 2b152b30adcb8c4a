//! Normalized subject identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use sw_shared::utils::identity::{mask_identity, normalize_identity};

use crate::errors::{DomainError, DomainResult};

/// A trimmed, lower-cased identity (the account e-mail address)
///
/// All throttling and code state is keyed by this form, so `Alice@Example.com`
/// and `alice@example.com` share one lockout record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalize a raw identity; blank input is rejected
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = normalize_identity(raw);
        if normalized.is_empty() {
            return Err(DomainError::validation("Identity must not be empty"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering
    pub fn masked(&self) -> String {
        mask_identity(&self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
