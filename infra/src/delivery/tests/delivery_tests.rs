//! Unit tests for delivery adapters

use chrono::{Duration, Utc};

use sw_core::{AccountConfirmation, CodeDelivery, CodeMessage, Identity, Purpose};
use sw_shared::config::{DeliveryConfig, DeliveryProvider};

use crate::delivery::webhook_delivery::RelayPayload;
use crate::delivery::{ConfiguredDelivery, LogDelivery, NoopConfirmation, WebhookDelivery};
use crate::InfrastructureError;

fn message() -> CodeMessage {
    CodeMessage {
        identity: Identity::parse("hana@example.com").unwrap(),
        purpose: Purpose::PasswordReset,
        code: "482913".to_string(),
        expires_at: Utc::now() + Duration::minutes(15),
    }
}

fn webhook_config(url: Option<&str>) -> DeliveryConfig {
    DeliveryConfig {
        provider: DeliveryProvider::Webhook,
        webhook_url: url.map(str::to_string),
        webhook_token: Some("relay-token".to_string()),
        timeout_seconds: 2,
    }
}

#[tokio::test]
async fn test_log_delivery_counts_messages() {
    let delivery = LogDelivery::new();

    let first = delivery.deliver(&message()).await.unwrap();
    let second = delivery.deliver(&message()).await.unwrap();

    assert!(first.starts_with("log_"));
    assert_ne!(first, second);
    assert_eq!(delivery.get_message_count(), 2);
}

#[test]
fn test_configured_delivery_defaults_to_log() {
    let delivery = ConfiguredDelivery::from_config(&DeliveryConfig::default()).unwrap();
    assert_eq!(delivery.provider(), DeliveryProvider::Log);
}

#[test]
fn test_webhook_requires_url() {
    let result = ConfiguredDelivery::from_config(&webhook_config(None));
    assert!(matches!(result, Err(InfrastructureError::Config(_))));

    let result = WebhookDelivery::new(&webhook_config(Some("  ")));
    assert!(matches!(result, Err(InfrastructureError::Config(_))));

    let delivery = ConfiguredDelivery::from_config(&webhook_config(Some("https://relay.internal/send")))
        .unwrap();
    assert_eq!(delivery.provider(), DeliveryProvider::Webhook);
}

#[tokio::test]
async fn test_webhook_unreachable_relay_fails() {
    // Port 9 (discard) is closed on test hosts
    let delivery = WebhookDelivery::new(&webhook_config(Some("http://127.0.0.1:9/send"))).unwrap();
    let result = delivery.deliver(&message()).await;
    assert!(result.is_err());
}

#[test]
fn test_relay_payload_shape() {
    let message = message();
    let value = serde_json::to_value(RelayPayload::from(&message)).unwrap();

    assert_eq!(value["identity"], "hana@example.com");
    assert_eq!(value["purpose"], "password_reset");
    assert_eq!(value["code"], "482913");
    assert!(value["expires_at"].is_string());
}

#[tokio::test]
async fn test_noop_confirmation_succeeds() {
    let identity = Identity::parse("hana@example.com").unwrap();
    tokio_test::assert_ok!(NoopConfirmation.confirm(&identity, Purpose::Signup).await);
}
