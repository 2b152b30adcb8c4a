//! Code issuer: gate, mint, hash and persist

use chrono::Duration;
use std::sync::Arc;
use sw_shared::config::MAX_POLICY_MINUTES;
use tracing::{error, info, warn};

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{LockoutRepository, RateLimitStore, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::lockout::IdentityLockoutTracker;
use crate::services::rate_limit::RateLimiter;

use super::config::VerificationServiceConfig;
use super::secret;
use super::types::IssuedCode;

/// Issues verification codes for (identity, purpose) pairs
pub struct CodeIssuer<C, L, S>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
{
    codes: Arc<C>,
    tracker: Arc<IdentityLockoutTracker<L>>,
    limiter: Arc<RateLimiter<S>>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl<C, L, S> CodeIssuer<C, L, S>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
{
    pub fn new(
        codes: Arc<C>,
        tracker: Arc<IdentityLockoutTracker<L>>,
        limiter: Arc<RateLimiter<S>>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            codes,
            tracker,
            limiter,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a new code, invalidating any previous unconsumed code for the pair
    ///
    /// This method:
    /// 1. Normalizes the identity
    /// 2. Counts the request against the issuance limit for the pair
    /// 3. Consults the identity lockout tracker
    /// 4. Generates a code and a salt, hashes them
    /// 5. Atomically replaces the live record for the pair
    ///
    /// # Arguments
    ///
    /// * `identity` - Raw identity as submitted
    /// * `purpose` - Flow the code is for
    /// * `ttl_minutes` - Lifetime of the code, 1 minute up to one year
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - The cleartext code, returned only here
    /// * `Err(DomainError)` - `Validation`, `RateLimitExceeded`, `Locked`, `RateLimited` or `Storage`
    pub async fn issue(
        &self,
        identity: &str,
        purpose: Purpose,
        ttl_minutes: i64,
    ) -> DomainResult<IssuedCode> {
        let identity = Identity::parse(identity)?;
        if !(1..=MAX_POLICY_MINUTES).contains(&ttl_minutes) {
            return Err(DomainError::validation(format!(
                "Code lifetime must be between 1 and {} minutes",
                MAX_POLICY_MINUTES
            )));
        }

        let rate_key = format!("issue:{}:{}", purpose, identity);
        let decision = self
            .limiter
            .check_limit(&rate_key, self.config.issuance_limit)
            .await?;
        if !decision.allowed {
            warn!(
                identity = %identity.masked(),
                purpose = %purpose,
                reset_at = %decision.reset_at,
                event = "issuance_rate_limited",
                "Code issuance refused by rate limit"
            );
            return Err(DomainError::RateLimitExceeded {
                reset_at: decision.reset_at,
            });
        }

        self.tracker.admit_attempt(&identity).await?.into_result()?;

        let settings = &self.config.code;
        let code = secret::generate_code(settings.code_length, settings.charset);
        let salt = secret::generate_salt(settings.salt_bytes);
        let code_hash = secret::hash_code(&code, &salt);

        let now = self.clock.now();
        let record = VerificationCode::new(
            identity.clone(),
            purpose,
            code_hash,
            salt,
            settings.max_attempts,
            now,
            Duration::minutes(ttl_minutes),
        );
        let issued = IssuedCode {
            id: record.id,
            identity: identity.clone(),
            purpose,
            code,
            expires_at: record.expires_at,
        };

        self.codes.replace_active(record).await.map_err(|e| {
            error!(
                identity = %identity.masked(),
                purpose = %purpose,
                error = %e,
                event = "code_storage_failed",
                "Failed to store verification code"
            );
            DomainError::from(e)
        })?;

        info!(
            identity = %identity.masked(),
            purpose = %purpose,
            code_id = %issued.id,
            expires_at = %issued.expires_at,
            event = "code_issued",
            "Issued verification code"
        );

        Ok(issued)
    }
}
