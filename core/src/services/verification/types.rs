//! Types for verification results

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::value_objects::{Identity, Purpose};
use crate::services::clock::seconds_until;

/// A freshly issued code, returned exactly once to the caller
#[derive(Clone)]
pub struct IssuedCode {
    pub id: Uuid,
    pub identity: Identity,
    pub purpose: Purpose,
    /// Cleartext code; only the hash is stored
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCode")
            .field("id", &self.id)
            .field("identity", &self.identity.masked())
            .field("purpose", &self.purpose)
            .field("code", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum VerifyResult {
    /// Code matched and this attempt consumed it
    Ok,
    /// Code did not match
    Invalid,
    /// The live code passed its expiry
    Expired,
    /// The live code has no attempts left
    MaxAttemptsExceeded,
    /// Identity is locked
    Locked { until: DateTime<Utc> },
    /// Identity failed too often inside the failure window
    RateLimited { next_allowed_at: DateTime<Utc> },
    /// No live code (never issued, replaced, or consumed)
    NotFound,
}

impl VerifyResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyResult::Ok)
    }

    /// Instant after which a throttled identity may retry
    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        match self {
            VerifyResult::Locked { until } => Some(*until),
            VerifyResult::RateLimited { next_allowed_at } => Some(*next_allowed_at),
            _ => None,
        }
    }

    /// Whole seconds until retry (at least 1) for throttled outcomes
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.retry_at().map(|at| seconds_until(at, now))
    }
}

/// Result of a code request, safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeDispatch {
    pub expires_at: DateTime<Utc>,
    /// Provider message id from the delivery collaborator
    pub delivery_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_retry_at_only_for_throttled_outcomes() {
        let until = Utc::now() + Duration::minutes(15);

        assert_eq!(VerifyResult::Locked { until }.retry_at(), Some(until));
        assert_eq!(
            VerifyResult::RateLimited { next_allowed_at: until }.retry_at(),
            Some(until)
        );
        assert_eq!(
            VerifyResult::Locked { until }.retry_after_seconds(until - Duration::seconds(30)),
            Some(30)
        );
        assert_eq!(VerifyResult::Invalid.retry_at(), None);
        assert_eq!(VerifyResult::Ok.retry_at(), None);
    }
}
