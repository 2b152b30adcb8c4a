//! HTTP relay delivery
//!
//! Posts each issued code as JSON to a relay (mail gateway, notification
//! service) that owns templating and transport. The relay answers with an
//! optional `{"id": "..."}` body used as the delivery id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use sw_core::{CodeDelivery, CodeMessage, Purpose};
use sw_shared::config::DeliveryConfig;

use crate::InfrastructureError;

/// Request body sent to the relay
#[derive(Debug, Serialize)]
pub(crate) struct RelayPayload<'a> {
    pub identity: &'a str,
    pub purpose: Purpose,
    pub code: &'a str,
    pub expires_at: DateTime<Utc>,
}

impl<'a> From<&'a CodeMessage> for RelayPayload<'a> {
    fn from(message: &'a CodeMessage) -> Self {
        Self {
            identity: message.identity.as_str(),
            purpose: message.purpose,
            code: &message.code,
            expires_at: message.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayReceipt {
    id: Option<String>,
}

/// Delivery collaborator posting to an HTTP relay
#[derive(Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl WebhookDelivery {
    /// Build from the delivery configuration
    ///
    /// # Errors
    /// `InfrastructureError::Config` if no relay URL is configured
    pub fn new(config: &DeliveryConfig) -> Result<Self, InfrastructureError> {
        let url = config
            .webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("delivery.webhook_url is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(event = "delivery_configured", provider = "webhook", "Webhook delivery initialized");

        Ok(Self {
            client,
            url,
            token: config.webhook_token.clone(),
        })
    }

    async fn post(&self, message: &CodeMessage) -> Result<String, InfrastructureError> {
        let mut request = self.client.post(&self.url).json(&RelayPayload::from(message));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::Delivery(format!(
                "relay responded with status {}",
                status
            )));
        }

        let receipt = response.json::<RelayReceipt>().await.ok();
        Ok(receipt
            .and_then(|r| r.id)
            .unwrap_or_else(|| format!("relay_{}", Uuid::new_v4())))
    }
}

#[async_trait]
impl CodeDelivery for WebhookDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<String, String> {
        match self.post(message).await {
            Ok(message_id) => {
                info!(
                    identity = %message.identity.masked(),
                    purpose = %message.purpose,
                    message_id = %message_id,
                    event = "code_delivered",
                    "Verification code handed to relay"
                );
                Ok(message_id)
            }
            Err(e) => {
                error!(
                    identity = %message.identity.masked(),
                    purpose = %message.purpose,
                    error = %e,
                    event = "code_delivery_failed",
                    "Relay delivery failed"
                );
                Err(e.to_string())
            }
        }
    }
}
