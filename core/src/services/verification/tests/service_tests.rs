//! Tests for the verification facade

use std::sync::Arc;

use crate::domain::value_objects::{Identity, Purpose};
use crate::errors::DomainError;
use crate::repositories::VerificationCodeRepository;
use crate::services::clock::Clock;
use crate::services::verification::VerifyResult;

use super::mocks::{Harness, MockConfirmation, MockDelivery};

#[tokio::test]
async fn test_request_code_delivers_and_hides_code() {
    let harness = Harness::new();
    let delivery = Arc::new(MockDelivery::new(false));
    let service = harness.service(delivery.clone(), Arc::new(MockConfirmation::new(false)));

    let dispatch = service
        .request_code("Alice@Example.com", Purpose::Signup)
        .await
        .unwrap();

    assert!(dispatch.delivery_id.starts_with("mock-msg-"));
    assert_eq!(
        dispatch.expires_at,
        harness.clock.now() + chrono::Duration::minutes(15)
    );
    let code = delivery.last_code("alice@example.com").unwrap();
    assert_eq!(code.len(), 6);
}

#[tokio::test]
async fn test_delivery_failure_keeps_code_live() {
    let harness = Harness::new();
    let service = harness.service(
        Arc::new(MockDelivery::new(true)),
        Arc::new(MockConfirmation::new(false)),
    );

    let err = service
        .request_code("bob@example.com", Purpose::Signup)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Delivery { .. }));

    let identity = Identity::parse("bob@example.com").unwrap();
    assert!(harness
        .codes
        .find_active(&identity, Purpose::Signup)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_confirm_code_calls_account_system_on_success_only() {
    let harness = Harness::new();
    let delivery = Arc::new(MockDelivery::new(false));
    let confirmation = Arc::new(MockConfirmation::new(false));
    let service = harness.service(delivery.clone(), confirmation.clone());

    service
        .request_code("carol@example.com", Purpose::PasswordReset)
        .await
        .unwrap();
    let code = delivery.last_code("carol@example.com").unwrap();

    let wrong: String = code.chars().map(|c| if c == '9' { '8' } else { '9' }).collect();
    assert_eq!(
        service
            .confirm_code("carol@example.com", Purpose::PasswordReset, &wrong)
            .await
            .unwrap(),
        VerifyResult::Invalid
    );
    assert_eq!(confirmation.count(), 0);

    assert_eq!(
        service
            .confirm_code("carol@example.com", Purpose::PasswordReset, &code)
            .await
            .unwrap(),
        VerifyResult::Ok
    );
    assert_eq!(confirmation.count(), 1);
    assert_eq!(
        confirmation.confirmed.lock().unwrap()[0],
        ("carol@example.com".to_string(), Purpose::PasswordReset)
    );
}

#[tokio::test]
async fn test_confirmation_failure_surfaces() {
    let harness = Harness::new();
    let delivery = Arc::new(MockDelivery::new(false));
    let service = harness.service(delivery.clone(), Arc::new(MockConfirmation::new(true)));

    service.request_code("dan@example.com", Purpose::Signup).await.unwrap();
    let code = delivery.last_code("dan@example.com").unwrap();

    let err = service
        .confirm_code("dan@example.com", Purpose::Signup, &code)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Confirmation { .. }));
}

#[tokio::test]
async fn test_request_code_propagates_throttling() {
    let harness = Harness::new();
    let service = harness.service(
        Arc::new(MockDelivery::new(false)),
        Arc::new(MockConfirmation::new(false)),
    );

    for _ in 0..5 {
        service.request_code("erin@example.com", Purpose::Signup).await.unwrap();
    }
    let err = service
        .request_code("erin@example.com", Purpose::Signup)
        .await
        .unwrap_err();
    assert!(err.retry_at().is_some());
    assert!(matches!(err, DomainError::RateLimitExceeded { .. }));
}
