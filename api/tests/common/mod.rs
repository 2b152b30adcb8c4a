//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use sw_api::AppState;
use sw_core::{
    AccountConfirmation, CodeDelivery, CodeMessage, Identity, InMemoryLockoutRepository,
    InMemoryRateLimitStore, InMemoryVerificationCodeRepository, ManualClock, Purpose,
    RateLimitCounter, RateLimitStore, StorageError, StorageResult, VerificationComponents,
    VerificationService,
};
use sw_shared::{AppConfig, ServerConfig};

/// Delivery double that keeps the last code per identity
#[derive(Default)]
pub struct CapturingDelivery {
    sent: Mutex<HashMap<String, String>>,
    pub fail: bool,
}

impl CapturingDelivery {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_code(&self, identity: &str) -> Option<String> {
        self.sent.lock().unwrap().get(identity).cloned()
    }
}

#[async_trait]
impl CodeDelivery for CapturingDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<String, String> {
        if self.fail {
            return Err("relay refused connection".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .insert(message.identity.to_string(), message.code.clone());
        Ok(format!("test_{}", Uuid::new_v4()))
    }
}

/// Account system double counting confirmations
#[derive(Default)]
pub struct RecordingConfirmation {
    confirmed: Mutex<Vec<(String, Purpose)>>,
}

impl RecordingConfirmation {
    pub fn count(&self) -> usize {
        self.confirmed.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountConfirmation for RecordingConfirmation {
    async fn confirm(&self, identity: &Identity, purpose: Purpose) -> Result<(), String> {
        self.confirmed
            .lock()
            .unwrap()
            .push((identity.to_string(), purpose));
        Ok(())
    }
}

/// Counter store whose backend is always down
pub struct UnavailableRateLimitStore;

#[async_trait]
impl RateLimitStore for UnavailableRateLimitStore {
    async fn hit(
        &self,
        _key: &str,
        _limit: u32,
        _window: Duration,
        _now: DateTime<Utc>,
    ) -> StorageResult<RateLimitCounter> {
        Err(StorageError::unavailable("counter backend offline"))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> StorageResult<u64> {
        Err(StorageError::unavailable("counter backend offline"))
    }
}

pub type TestState<S> = AppState<
    InMemoryVerificationCodeRepository,
    InMemoryLockoutRepository,
    S,
    CapturingDelivery,
    RecordingConfirmation,
>;

pub struct TestContext<S: RateLimitStore> {
    pub state: web::Data<TestState<S>>,
    pub server: ServerConfig,
    pub clock: Arc<ManualClock>,
    pub delivery: Arc<CapturingDelivery>,
    pub confirmation: Arc<RecordingConfirmation>,
}

impl TestContext<InMemoryRateLimitStore> {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(
            config,
            Arc::new(InMemoryRateLimitStore::new()),
            CapturingDelivery::default(),
        )
    }
}

impl<S: RateLimitStore + 'static> TestContext<S> {
    pub fn build(config: AppConfig, counters: Arc<S>, delivery: CapturingDelivery) -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let components = VerificationComponents::assemble(
            Arc::new(InMemoryVerificationCodeRepository::new()),
            Arc::new(InMemoryLockoutRepository::new()),
            counters,
            clock.clone(),
            &config,
        );

        let delivery = Arc::new(delivery);
        let confirmation = Arc::new(RecordingConfirmation::default());
        let verification = Arc::new(VerificationService::new(
            components.issuer.clone(),
            components.verifier.clone(),
            delivery.clone(),
            confirmation.clone(),
        ));

        let state = web::Data::new(AppState::new(
            verification,
            components.limiter.clone(),
            clock.clone(),
            Vec::new(),
        ));

        Self {
            state,
            server: config.server,
            clock,
            delivery,
            confirmation,
        }
    }
}

pub fn send_code_body(identity: &str, purpose: &str) -> serde_json::Value {
    serde_json::json!({ "identity": identity, "purpose": purpose })
}

pub fn verify_code_body(identity: &str, purpose: &str, code: &str) -> serde_json::Value {
    serde_json::json!({ "identity": identity, "purpose": purpose, "code": code })
}
