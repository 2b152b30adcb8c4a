//! Per-origin route throttling
//!
//! Every request under the API prefix is counted against a fixed window keyed
//! by route class and client address. Requests outside the prefix (health
//! checks) are never counted. A failing counter store lets the request
//! through; the code issuer still enforces its own ceilings.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};
use tracing::{debug, warn};

use sw_core::{Clock, RateLimitDecision, RateLimitStore, RateLimiter, RouteClass};

use crate::handlers::throttled_response;

const API_PREFIX: &str = "/api/v1";
const AUTH_PREFIX: &str = "/api/v1/auth";
const WEBHOOK_PREFIX: &str = "/api/v1/webhooks";

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Route class for a request path, or `None` when the path is not throttled
pub fn route_class_for(path: &str) -> Option<RouteClass> {
    if path.starts_with(AUTH_PREFIX) {
        Some(RouteClass::Auth)
    } else if path.starts_with(WEBHOOK_PREFIX) {
        Some(RouteClass::Webhook)
    } else if path.starts_with(API_PREFIX) {
        Some(RouteClass::Api)
    } else {
        None
    }
}

/// Resolve the client address
///
/// With `trust_proxy` set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise only the socket peer address is used.
pub fn extract_client_ip(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = req
            .headers()
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return real_ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limit middleware factory
pub struct RouteRateLimit<R: RateLimitStore> {
    limiter: Arc<RateLimiter<R>>,
    clock: Arc<dyn Clock>,
    trust_proxy: bool,
}

impl<R: RateLimitStore> RouteRateLimit<R> {
    pub fn new(limiter: Arc<RateLimiter<R>>, clock: Arc<dyn Clock>, trust_proxy: bool) -> Self {
        Self {
            limiter,
            clock,
            trust_proxy,
        }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for RouteRateLimit<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: RateLimitStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteRateLimitMiddleware<S, R>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteRateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            clock: self.clock.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

/// Rate limit middleware service
pub struct RouteRateLimitMiddleware<S, R: RateLimitStore> {
    service: Rc<S>,
    limiter: Arc<RateLimiter<R>>,
    clock: Arc<dyn Clock>,
    trust_proxy: bool,
}

impl<S, B, R> Service<ServiceRequest> for RouteRateLimitMiddleware<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: RateLimitStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();
        let clock = self.clock.clone();
        let trust_proxy = self.trust_proxy;

        Box::pin(async move {
            let class = match route_class_for(req.path()) {
                Some(class) if limiter.is_enabled() => class,
                _ => return service.call(req).await.map(|res| res.map_into_left_body()),
            };

            let origin = extract_client_ip(req.request(), trust_proxy);

            let decision = match limiter.check_route(class, &origin).await {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(
                        event = "rate_limit_unavailable",
                        route_class = %class,
                        error = %e,
                        "Rate limit store failed, allowing request"
                    );
                    return service.call(req).await.map(|res| res.map_into_left_body());
                }
            };

            if !decision.allowed {
                debug!(
                    event = "route_throttled",
                    route_class = %class,
                    origin = %origin,
                    reset_at = %decision.reset_at,
                    "Route rate limit exceeded"
                );
                let mut response = throttled_response(decision.retry_after_seconds(clock.now()));
                insert_limit_headers(response.headers_mut(), &decision);
                return Ok(req.into_response(response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            insert_limit_headers(res.headers_mut(), &decision);
            Ok(res.map_into_left_body())
        })
    }
}

fn insert_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_LIMIT),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_REMAINING),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_RESET),
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}
