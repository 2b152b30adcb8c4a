//! Verification facade composing issuer, verifier and collaborators

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{LockoutRepository, RateLimitStore, VerificationCodeRepository};

use super::issuer::CodeIssuer;
use super::traits::{AccountConfirmation, CodeDelivery, CodeMessage};
use super::types::{CodeDispatch, VerifyResult};
use super::verifier::CodeVerifier;

/// Verification service for account confirmation flows
pub struct VerificationService<C, L, S, D, A>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
    D: CodeDelivery,
    A: AccountConfirmation,
{
    issuer: Arc<CodeIssuer<C, L, S>>,
    verifier: Arc<CodeVerifier<C, L>>,
    delivery: Arc<D>,
    confirmation: Arc<A>,
}

impl<C, L, S, D, A> VerificationService<C, L, S, D, A>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
    D: CodeDelivery,
    A: AccountConfirmation,
{
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `issuer` - Code issuer
    /// * `verifier` - Code verifier sharing the issuer's stores
    /// * `delivery` - Outbound delivery collaborator
    /// * `confirmation` - Account system collaborator
    pub fn new(
        issuer: Arc<CodeIssuer<C, L, S>>,
        verifier: Arc<CodeVerifier<C, L>>,
        delivery: Arc<D>,
        confirmation: Arc<A>,
    ) -> Self {
        Self {
            issuer,
            verifier,
            delivery,
            confirmation,
        }
    }

    /// Issue a code with the configured lifetime and hand it to delivery
    ///
    /// The cleartext code never leaves this method except through the
    /// delivery collaborator. If delivery fails the stored code stays live
    /// and the caller may simply request again.
    pub async fn request_code(&self, identity: &str, purpose: Purpose) -> DomainResult<CodeDispatch> {
        let ttl_minutes = self.issuer.config().code.ttl_minutes;
        let issued = self.issuer.issue(identity, purpose, ttl_minutes).await?;

        let message = CodeMessage {
            identity: issued.identity.clone(),
            purpose: issued.purpose,
            code: issued.code,
            expires_at: issued.expires_at,
        };

        let delivery_id = self.delivery.deliver(&message).await.map_err(|e| {
            error!(
                identity = %message.identity.masked(),
                purpose = %purpose,
                error = %e,
                event = "code_delivery_failed",
                "Failed to deliver verification code"
            );
            DomainError::Delivery { message: e }
        })?;

        info!(
            identity = %message.identity.masked(),
            purpose = %purpose,
            delivery_id = %delivery_id,
            event = "code_dispatched",
            "Verification code handed to delivery"
        );

        Ok(CodeDispatch {
            expires_at: message.expires_at,
            delivery_id,
        })
    }

    /// Verify a code and, on success, confirm the account flow
    ///
    /// # Returns
    ///
    /// * `Ok(VerifyResult::Ok)` - Verified and confirmed
    /// * `Ok(other)` - Verification refused; nothing was confirmed
    /// * `Err(DomainError::Confirmation)` - Code consumed but the account system failed
    pub async fn confirm_code(
        &self,
        identity: &str,
        purpose: Purpose,
        code: &str,
    ) -> DomainResult<VerifyResult> {
        let result = self.verifier.verify(identity, purpose, code).await?;
        if !result.is_ok() {
            return Ok(result);
        }

        let identity = Identity::parse(identity)?;
        self.confirmation
            .confirm(&identity, purpose)
            .await
            .map_err(|e| {
                error!(
                    identity = %identity.masked(),
                    purpose = %purpose,
                    error = %e,
                    event = "account_confirmation_failed",
                    "Account confirmation failed after successful verification"
                );
                DomainError::Confirmation { message: e }
            })?;

        Ok(result)
    }

    pub fn issuer(&self) -> &Arc<CodeIssuer<C, L, S>> {
        &self.issuer
    }

    pub fn verifier(&self) -> &Arc<CodeVerifier<C, L>> {
        &self.verifier
    }
}
