//! Collaborators the verification flow hands work to

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_objects::{Identity, Purpose};

/// Payload handed to the delivery collaborator
#[derive(Clone)]
pub struct CodeMessage {
    pub identity: Identity,
    pub purpose: Purpose,
    /// Cleartext code; never log this
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for CodeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeMessage")
            .field("identity", &self.identity.masked())
            .field("purpose", &self.purpose)
            .field("code", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Trait for outbound code delivery (mail relay, log sink)
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Deliver a code; returns a provider message id
    async fn deliver(&self, message: &CodeMessage) -> Result<String, String>;
}

/// Trait for the account system acting on a successful verification
#[async_trait]
pub trait AccountConfirmation: Send + Sync {
    /// Mark the identity confirmed for the given flow
    async fn confirm(&self, identity: &Identity, purpose: Purpose) -> Result<(), String>;
}
