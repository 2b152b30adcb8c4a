//! Wiring of the four throttling and code components over shared stores

use std::sync::Arc;

use sw_shared::config::AppConfig;

use crate::domain::entities::LockoutPolicy;
use crate::repositories::{LockoutRepository, RateLimitStore, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::lockout::IdentityLockoutTracker;
use crate::services::rate_limit::RateLimiter;

use super::config::VerificationServiceConfig;
use super::issuer::CodeIssuer;
use super::verifier::CodeVerifier;

/// The component graph, leaf first
pub struct VerificationComponents<C, L, S>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
{
    pub limiter: Arc<RateLimiter<S>>,
    pub tracker: Arc<IdentityLockoutTracker<L>>,
    pub issuer: Arc<CodeIssuer<C, L, S>>,
    pub verifier: Arc<CodeVerifier<C, L>>,
}

impl<C, L, S> VerificationComponents<C, L, S>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
{
    /// Build every component over the given stores and policy
    pub fn assemble(
        codes: Arc<C>,
        lockouts: Arc<L>,
        counters: Arc<S>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            counters,
            clock.clone(),
            config.rate_limit.clone(),
        ));
        let tracker = Arc::new(IdentityLockoutTracker::new(
            lockouts,
            clock.clone(),
            LockoutPolicy::from(&config.lockout),
        ));
        let issuer = Arc::new(CodeIssuer::new(
            codes.clone(),
            tracker.clone(),
            limiter.clone(),
            clock.clone(),
            VerificationServiceConfig::from(config),
        ));
        let verifier = Arc::new(CodeVerifier::new(codes, tracker.clone(), clock));

        Self {
            limiter,
            tracker,
            issuer,
            verifier,
        }
    }
}
