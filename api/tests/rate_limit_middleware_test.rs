//! Tests for per-origin route throttling and the health endpoint

mod common;

use actix_web::{http::header, http::StatusCode, test};
use std::sync::Arc;

use common::{verify_code_body, CapturingDelivery, TestContext, UnavailableRateLimitStore};
use sw_api::create_app;
use sw_shared::{error_codes, AppConfig, WindowLimit};

fn strict_auth_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.rate_limit.auth = WindowLimit::new(2, 60);
    config
}

fn verify_from(origin: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/verify-code")
        .insert_header(("X-Forwarded-For", origin))
        .set_json(verify_code_body("carol@example.com", "signup", "123456"))
}

#[actix_web::test]
async fn test_auth_routes_throttled_per_origin() {
    let ctx = TestContext::with_config(strict_auth_config());
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    for expected_remaining in ["1", "0"] {
        let resp = test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "2");
        assert_eq!(
            resp.headers().get("x-ratelimit-remaining").unwrap(),
            expected_remaining
        );
    }

    let resp = test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], error_codes::RATE_LIMIT_EXCEEDED);

    // Another origin has its own window
    let resp = test::call_service(&app, verify_from("198.51.100.4").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_window_reset_lets_origin_back_in() {
    let ctx = TestContext::with_config(strict_auth_config());
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    for _ in 0..3 {
        test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
    }
    ctx.clock.advance(chrono::Duration::seconds(61));

    let resp = test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_forwarded_header_ignored_when_proxy_untrusted() {
    let mut config = strict_auth_config();
    config.server.trust_proxy_headers = false;
    let ctx = TestContext::with_config(config);
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    // Spoofed addresses all collapse onto the same peer
    let statuses = [
        test::call_service(&app, verify_from("10.0.0.1").to_request()).await.status(),
        test::call_service(&app, verify_from("10.0.0.2").to_request()).await.status(),
        test::call_service(&app, verify_from("10.0.0.3").to_request()).await.status(),
    ];
    assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_disabled_limiter_never_throttles() {
    let mut config = strict_auth_config();
    config.rate_limit.enabled = false;
    let ctx = TestContext::with_config(config);
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    for _ in 0..5 {
        let resp = test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.headers().contains_key("x-ratelimit-limit"));
    }
}

#[actix_web::test]
async fn test_counter_outage_fails_open() {
    let ctx = TestContext::build(
        strict_auth_config(),
        Arc::new(UnavailableRateLimitStore),
        CapturingDelivery::default(),
    );
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    for _ in 0..4 {
        let resp = test::call_service(&app, verify_from("203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // Issuance still consults the counter store and surfaces the outage
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .set_json(common::send_code_body("carol@example.com", "signup"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_health_is_not_throttled() {
    let mut config = AppConfig::development();
    config.rate_limit.api = WindowLimit::new(1, 60);
    config.rate_limit.auth = WindowLimit::new(1, 60);
    let ctx = TestContext::with_config(config);
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["storage"]["status"], "healthy");
    }
}

#[actix_web::test]
async fn test_unknown_route_returns_json_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.server)).await;

    let req = test::TestRequest::get().uri("/api/v1/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], error_codes::NOT_FOUND);
}
