//! Health endpoint and backend probes

use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use std::collections::HashMap;

use sw_core::{
    AccountConfirmation, CodeDelivery, LockoutRepository, RateLimitStore,
    VerificationCodeRepository,
};
use sw_infra::{DatabasePool, RedisClient};
use sw_shared::{HealthResponse, HealthStatus, ServiceHealth};

use crate::app::AppState;

/// A backend the health endpoint reports on
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> ServiceHealth;
}

#[async_trait]
impl HealthProbe for DatabasePool {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn check(&self) -> ServiceHealth {
        match self.health_check().await {
            Ok(true) => ServiceHealth::healthy(),
            Ok(false) => ServiceHealth::unhealthy("unexpected probe result"),
            Err(e) => ServiceHealth::unhealthy(e.to_string()),
        }
    }
}

#[async_trait]
impl HealthProbe for RedisClient {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> ServiceHealth {
        match self.health_check().await {
            Ok(true) => ServiceHealth::healthy(),
            Ok(false) => ServiceHealth::unhealthy("unexpected PING reply"),
            Err(e) => ServiceHealth::unhealthy(e.to_string()),
        }
    }
}

/// Handler for GET /health
///
/// In-memory deployments have no probes and report a single healthy
/// `storage` entry. Any failing probe answers `503`.
pub async fn health_check<C, L, S, D, A>(state: web::Data<AppState<C, L, S, D, A>>) -> HttpResponse
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
    D: CodeDelivery + 'static,
    A: AccountConfirmation + 'static,
{
    let mut services = HashMap::new();
    if state.probes.is_empty() {
        services.insert("storage".to_string(), ServiceHealth::healthy());
    }
    for probe in &state.probes {
        services.insert(probe.name().to_string(), probe.check().await);
    }

    let response = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));
    if response.status == HealthStatus::Healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
