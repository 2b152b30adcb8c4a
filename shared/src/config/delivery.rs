//! Code delivery configuration

use serde::{Deserialize, Serialize};

/// How issued codes reach the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// Log a masked delivery record (development)
    #[default]
    Log,
    /// POST the message to an outbound mail relay
    Webhook,
}

/// Delivery collaborator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub provider: DeliveryProvider,

    /// Relay endpoint for the webhook provider
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Bearer token sent to the relay
    #[serde(default)]
    pub webhook_token: Option<String>,

    /// Relay request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            provider: DeliveryProvider::default(),
            webhook_url: None,
            webhook_token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}
