//! Account confirmation stand-in

use async_trait::async_trait;
use tracing::info;

use sw_core::{AccountConfirmation, Identity, Purpose};

/// Confirmation collaborator that records the event and does nothing else
///
/// Deployments embedding the subsystem wire their own account service here.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConfirmation;

#[async_trait]
impl AccountConfirmation for NoopConfirmation {
    async fn confirm(&self, identity: &Identity, purpose: Purpose) -> Result<(), String> {
        info!(
            identity = %identity.masked(),
            purpose = %purpose,
            event = "account_confirmed",
            "Verification succeeded; no account system attached"
        );
        Ok(())
    }
}
