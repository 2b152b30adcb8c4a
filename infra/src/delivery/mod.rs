//! Delivery Module
//!
//! Adapters for the delivery and confirmation collaborators:
//!
//! - **LogDelivery**: development sink, logs masked identity only
//! - **WebhookDelivery**: JSON POST to an HTTP relay
//! - **NoopConfirmation**: logs successful verifications

use async_trait::async_trait;

use sw_core::{CodeDelivery, CodeMessage};
use sw_shared::config::{DeliveryConfig, DeliveryProvider};

use crate::InfrastructureError;

pub mod confirmation;
pub mod log_delivery;
pub mod webhook_delivery;

pub use confirmation::NoopConfirmation;
pub use log_delivery::LogDelivery;
pub use webhook_delivery::WebhookDelivery;

#[cfg(test)]
mod tests;

/// The delivery collaborator selected by configuration
#[derive(Clone)]
pub enum ConfiguredDelivery {
    Log(LogDelivery),
    Webhook(WebhookDelivery),
}

impl ConfiguredDelivery {
    /// Create the delivery adapter named by `config.provider`
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, InfrastructureError> {
        match config.provider {
            DeliveryProvider::Log => Ok(Self::Log(LogDelivery::new())),
            DeliveryProvider::Webhook => Ok(Self::Webhook(WebhookDelivery::new(config)?)),
        }
    }

    pub fn provider(&self) -> DeliveryProvider {
        match self {
            Self::Log(_) => DeliveryProvider::Log,
            Self::Webhook(_) => DeliveryProvider::Webhook,
        }
    }
}

#[async_trait]
impl CodeDelivery for ConfiguredDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<String, String> {
        match self {
            Self::Log(inner) => inner.deliver(message).await,
            Self::Webhook(inner) => inner.deliver(message).await,
        }
    }
}
