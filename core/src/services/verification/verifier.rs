//! Code verifier: compare, consume or penalize

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::CodeStatus;
use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::DomainResult;
use crate::repositories::{LockoutRepository, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::lockout::{AdmitResult, IdentityLockoutTracker};

use super::secret;
use super::types::VerifyResult;

/// Verifies submitted codes against stored hashes
pub struct CodeVerifier<C, L>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
{
    codes: Arc<C>,
    tracker: Arc<IdentityLockoutTracker<L>>,
    clock: Arc<dyn Clock>,
}

impl<C, L> CodeVerifier<C, L>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
{
    pub fn new(codes: Arc<C>, tracker: Arc<IdentityLockoutTracker<L>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            codes,
            tracker,
            clock,
        }
    }

    /// Verify a submitted code
    ///
    /// Expired and already exhausted codes are reported without counting a
    /// failure. A mismatch increments the code's attempts and records a
    /// failure for the identity. A match consumes the code with a
    /// compare-and-set; of several racing correct submissions exactly one
    /// gets `Ok`, the others `NotFound`.
    ///
    /// # Returns
    ///
    /// * `Ok(VerifyResult)` - The outcome; only `VerifyResult::Ok` means verified
    /// * `Err(DomainError)` - Invalid identity or storage failure
    pub async fn verify(
        &self,
        identity: &str,
        purpose: Purpose,
        submitted: &str,
    ) -> DomainResult<VerifyResult> {
        let identity = Identity::parse(identity)?;

        match self.tracker.admit_attempt(&identity).await? {
            AdmitResult::Allowed { .. } => {}
            AdmitResult::Locked { lockout_expires_at } => {
                return Ok(VerifyResult::Locked {
                    until: lockout_expires_at,
                })
            }
            AdmitResult::RateLimited { next_allowed_at } => {
                return Ok(VerifyResult::RateLimited { next_allowed_at })
            }
        }

        let record = match self.codes.find_active(&identity, purpose).await? {
            Some(record) => record,
            None => return Ok(VerifyResult::NotFound),
        };

        let now = self.clock.now();
        match record.status_at(now) {
            CodeStatus::Pending => {}
            CodeStatus::Expired => return Ok(VerifyResult::Expired),
            CodeStatus::Exhausted => return Ok(VerifyResult::MaxAttemptsExceeded),
            CodeStatus::Consumed => return Ok(VerifyResult::NotFound),
        }

        if !secret::matches(submitted.trim(), &record.salt, &record.code_hash) {
            let attempts = self.codes.increment_attempts(record.id).await?;
            self.tracker.record_outcome(&identity, false).await?;

            warn!(
                identity = %identity.masked(),
                purpose = %purpose,
                code_id = %record.id,
                attempts = ?attempts,
                event = "code_mismatch",
                "Verification code mismatch"
            );

            return Ok(match attempts {
                Some(n) if n >= record.max_attempts => VerifyResult::MaxAttemptsExceeded,
                _ => VerifyResult::Invalid,
            });
        }

        if !self.codes.consume(record.id, now).await? {
            info!(
                identity = %identity.masked(),
                purpose = %purpose,
                code_id = %record.id,
                event = "code_consume_lost",
                "Code was consumed or exhausted concurrently"
            );
            return Ok(VerifyResult::NotFound);
        }

        self.tracker.record_outcome(&identity, true).await?;

        info!(
            identity = %identity.masked(),
            purpose = %purpose,
            code_id = %record.id,
            event = "code_verified",
            "Verification code consumed"
        );

        Ok(VerifyResult::Ok)
    }
}
