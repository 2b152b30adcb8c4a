//! Application state and factory
//!
//! `create_app` is shared by the binary and the integration tests so both
//! exercise the same routes and middleware stack.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use sw_core::{
    AccountConfirmation, Clock, CodeDelivery, LockoutRepository, RateLimitStore, RateLimiter,
    VerificationCodeRepository, VerificationService,
};
use sw_shared::{error_codes, ErrorResponse, ServerConfig};

use crate::handlers::json_error_handler;
use crate::middleware::RouteRateLimit;
use crate::routes::auth::{send_code::send_code, verify_code::verify_code};
use crate::routes::health::{health_check, HealthProbe};

/// Application state that holds shared services
pub struct AppState<C, L, S, D, A>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
    D: CodeDelivery,
    A: AccountConfirmation,
{
    pub verification: Arc<VerificationService<C, L, S, D, A>>,
    pub limiter: Arc<RateLimiter<S>>,
    pub clock: Arc<dyn Clock>,
    /// Backends reported by the health endpoint
    pub probes: Vec<Arc<dyn HealthProbe>>,
}

impl<C, L, S, D, A> AppState<C, L, S, D, A>
where
    C: VerificationCodeRepository,
    L: LockoutRepository,
    S: RateLimitStore,
    D: CodeDelivery,
    A: AccountConfirmation,
{
    pub fn new(
        verification: Arc<VerificationService<C, L, S, D, A>>,
        limiter: Arc<RateLimiter<S>>,
        clock: Arc<dyn Clock>,
        probes: Vec<Arc<dyn HealthProbe>>,
    ) -> Self {
        Self {
            verification,
            limiter,
            clock,
            probes,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<C, L, S, D, A>(
    app_state: web::Data<AppState<C, L, S, D, A>>,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
    D: CodeDelivery + 'static,
    A: AccountConfirmation + 'static,
{
    let rate_limit = RouteRateLimit::new(
        app_state.limiter.clone(),
        app_state.clock.clone(),
        server.trust_proxy_headers,
    );
    let json_config = web::JsonConfig::default()
        .limit(server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Outermost wrap runs first: every request gets a span before throttling
        .wrap(rate_limit)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check::<C, L, S, D, A>))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/send-code", web::post().to(send_code::<C, L, S, D, A>))
                    .route("/verify-code", web::post().to(verify_code::<C, L, S, D, A>)),
            ),
        )
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
