//! Log-sink delivery for development
//!
//! Records that a code was issued without ever writing the code itself; in
//! development the code is read back through the test harness or a debugger,
//! never from logs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use sw_core::{CodeDelivery, CodeMessage};

/// Delivery collaborator that only logs
#[derive(Clone, Default)]
pub struct LogDelivery {
    /// Counter for tracking number of messages handled
    message_count: Arc<AtomicU64>,
}

impl LogDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of messages handled
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeDelivery for LogDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<String, String> {
        let message_id = format!("log_{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            identity = %message.identity.masked(),
            purpose = %message.purpose,
            expires_at = %message.expires_at,
            message_id = %message_id,
            event = "code_delivered",
            "Verification code recorded by log delivery"
        );

        Ok(message_id)
    }
}
