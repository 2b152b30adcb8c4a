//! Identity lockout tracker
//!
//! Holds the single authoritative throttle state per identity. Both the code
//! issuer and the code verifier consult it before doing any work, and the
//! verifier reports every comparison outcome back to it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{LockoutPolicy, LockoutState};
use crate::domain::value_objects::Identity;
use crate::errors::{DomainError, DomainResult, StorageResult};
use crate::repositories::LockoutRepository;
use crate::services::clock::Clock;

/// Admission decision for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitResult {
    Allowed { remaining_attempts: u32 },
    Locked { lockout_expires_at: DateTime<Utc> },
    RateLimited { next_allowed_at: DateTime<Utc> },
}

impl AdmitResult {
    /// Convert a refusal into the matching domain error
    pub fn into_result(self) -> DomainResult<u32> {
        match self {
            AdmitResult::Allowed { remaining_attempts } => Ok(remaining_attempts),
            AdmitResult::Locked { lockout_expires_at } => Err(DomainError::Locked {
                until: lockout_expires_at,
            }),
            AdmitResult::RateLimited { next_allowed_at } => {
                Err(DomainError::RateLimited { next_allowed_at })
            }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmitResult::Allowed { .. })
    }
}

/// Service tracking failures and lockouts per identity
pub struct IdentityLockoutTracker<L: LockoutRepository> {
    repository: Arc<L>,
    clock: Arc<dyn Clock>,
    policy: LockoutPolicy,
}

impl<L: LockoutRepository> IdentityLockoutTracker<L> {
    pub fn new(repository: Arc<L>, clock: Arc<dyn Clock>, policy: LockoutPolicy) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Decide whether `identity` may make an attempt now
    ///
    /// Checked in order: active lockout, failures inside the rate window,
    /// then the remaining consecutive-failure allowance. Read only.
    pub async fn admit_attempt(&self, identity: &Identity) -> StorageResult<AdmitResult> {
        let now = self.clock.now();
        let state = match self.repository.load(identity).await? {
            Some(state) => state,
            None => {
                return Ok(AdmitResult::Allowed {
                    remaining_attempts: self.policy.max_failures,
                })
            }
        };

        if let Some(until) = state.lockout_until.filter(|until| now < *until) {
            debug!(
                identity = %identity.masked(),
                lockout_until = %until,
                event = "lockout_active",
                "Attempt refused, identity locked"
            );
            return Ok(AdmitResult::Locked {
                lockout_expires_at: until,
            });
        }

        if state.window_failures_at(now, self.policy.window) >= self.policy.window_max_failures {
            if let Some(window_end) = state.window_ends_at(now, self.policy.window) {
                debug!(
                    identity = %identity.masked(),
                    next_allowed_at = %window_end,
                    event = "failure_rate_limited",
                    "Attempt refused, too many failures in window"
                );
                return Ok(AdmitResult::RateLimited {
                    next_allowed_at: window_end,
                });
            }
        }

        Ok(AdmitResult::Allowed {
            remaining_attempts: self.policy.max_failures.saturating_sub(state.failure_count),
        })
    }

    /// Record the outcome of an attempt
    ///
    /// Success clears every trace of the identity. Failure increments the
    /// consecutive counter and may start a lockout.
    pub async fn record_outcome(&self, identity: &Identity, success: bool) -> StorageResult<()> {
        if success {
            if self.repository.clear(identity).await? {
                debug!(
                    identity = %identity.masked(),
                    event = "lockout_cleared",
                    "Lockout state cleared after success"
                );
            }
            return Ok(());
        }

        let now = self.clock.now();
        let policy = self.policy;
        let owner = identity.clone();
        let state = self
            .repository
            .update(identity, move |current| {
                let mut state = current.unwrap_or_else(|| LockoutState::new(owner, now));
                state.register_failure(now, &policy);
                Some(state)
            })
            .await?;

        if let Some(state) = state {
            match state.lockout_until {
                Some(until) if until == now + policy.lockout_duration => {
                    warn!(
                        identity = %identity.masked(),
                        lockout_until = %until,
                        event = "identity_locked",
                        "Identity locked after repeated failures"
                    );
                }
                _ => {
                    info!(
                        identity = %identity.masked(),
                        failure_count = state.failure_count,
                        window_failures = state.window_failures,
                        event = "attempt_failed",
                        "Failed attempt recorded"
                    );
                }
            }
        }

        Ok(())
    }

    /// Current state, for diagnostics
    pub async fn state(&self, identity: &Identity) -> StorageResult<Option<LockoutState>> {
        self.repository.load(identity).await
    }

    /// Remove unlocked entries idle for the retention horizon
    pub async fn purge_stale(&self) -> StorageResult<u64> {
        self.repository
            .purge_stale(self.clock.now(), self.policy.retention)
            .await
    }
}
