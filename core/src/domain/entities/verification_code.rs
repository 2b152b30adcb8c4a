//! Verification code entity for e-mail based account confirmation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Identity, Purpose};

/// Derived lifecycle state of a stored code
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Pending,
    Consumed,
    Expired,
    Exhausted,
}

/// A persisted verification code
///
/// Only the salted SHA-256 of the code is stored; the cleartext exists once,
/// in the value returned to the issuer's caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Normalized subject the code was issued to
    pub identity: Identity,

    /// Flow the code belongs to
    pub purpose: Purpose,

    /// Lowercase hex SHA-256 of `code + salt`
    pub code_hash: String,

    /// Hex encoded random salt, unique per issuance
    pub salt: String,

    /// Failed comparisons so far; never decreases
    pub attempts: u32,

    /// Failed comparisons allowed before the record is exhausted
    pub max_attempts: u32,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Set exactly once, on successful verification
    pub consumed_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    /// Creates a fresh pending record
    ///
    /// # Arguments
    ///
    /// * `identity` - Normalized subject
    /// * `purpose` - Flow the code is bound to
    /// * `code_hash` - Salted hash of the cleartext code
    /// * `salt` - Hex salt used for the hash
    /// * `max_attempts` - Per-code failure ceiling
    /// * `now` - Issuance instant
    /// * `ttl` - Lifetime of the code
    pub fn new(
        identity: Identity,
        purpose: Purpose,
        code_hash: String,
        salt: String,
        max_attempts: u32,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            purpose,
            code_hash,
            salt,
            attempts: 0,
            max_attempts,
            created_at: now,
            expires_at: now + ttl,
            consumed_at: None,
        }
    }

    /// Expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Lifecycle state at `now`; consumption wins over expiry, expiry over exhaustion
    pub fn status_at(&self, now: DateTime<Utc>) -> CodeStatus {
        if self.is_consumed() {
            CodeStatus::Consumed
        } else if self.is_expired_at(now) {
            CodeStatus::Expired
        } else if self.is_exhausted() {
            CodeStatus::Exhausted
        } else {
            CodeStatus::Pending
        }
    }

    /// Gets the number of remaining verification attempts (0 if exhausted)
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}
