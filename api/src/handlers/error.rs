//! Mapping of domain outcomes onto HTTP responses
//!
//! Throttling outcomes all share one generic 429 body so a caller cannot tell
//! an issuance ceiling from an identity lockout. Likewise an unknown code and a
//! wrong code share a body, as do expired and exhausted codes.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use chrono::{DateTime, Utc};
use tracing::error;
use validator::ValidationErrors;

use sw_core::{DomainError, VerifyResult};
use sw_shared::{error_codes, ApiResponse, ErrorResponse};

use crate::dto::VerifyCodeResponse;

const THROTTLED_MESSAGE: &str = "Too many attempts, try later";
const INVALID_CODE_MESSAGE: &str = "Invalid verification code";
const SPENT_CODE_MESSAGE: &str = "Verification code is no longer valid, request a new code";
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// 429 with a `Retry-After` header of `retry_after` seconds
pub fn throttled_response(retry_after: i64) -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header((header::RETRY_AFTER, retry_after.to_string()))
        .json(
            ErrorResponse::new(error_codes::RATE_LIMIT_EXCEEDED, THROTTLED_MESSAGE)
                .add_detail("retry_after", retry_after),
        )
}

/// Convert a domain error into its HTTP response
pub fn domain_error_response(err: &DomainError, now: DateTime<Utc>) -> HttpResponse {
    match err {
        DomainError::RateLimitExceeded { .. }
        | DomainError::RateLimited { .. }
        | DomainError::Locked { .. } => {
            throttled_response(err.retry_after_seconds(now).unwrap_or(1))
        }
        DomainError::Validation { message } => HttpResponse::BadRequest()
            .json(ErrorResponse::new(error_codes::VALIDATION_ERROR, message.as_str())),
        DomainError::Delivery { message } => {
            error!(event = "delivery_failed", error = %message, "Code delivery failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Unable to send verification code, try again later",
            ))
        }
        DomainError::Confirmation { message } => {
            error!(event = "confirmation_failed", error = %message, "Account confirmation failed");
            internal_error_response()
        }
        DomainError::Storage(e) => {
            error!(event = "storage_failed", error = %e, "Storage backend failed");
            internal_error_response()
        }
    }
}

/// Convert a verification outcome into its HTTP response
pub fn verify_result_response(result: &VerifyResult, now: DateTime<Utc>) -> HttpResponse {
    match result {
        VerifyResult::Ok => {
            HttpResponse::Ok().json(ApiResponse::success(VerifyCodeResponse { verified: true }))
        }
        VerifyResult::Invalid | VerifyResult::NotFound => HttpResponse::BadRequest().json(
            ErrorResponse::new(error_codes::VERIFICATION_CODE_INVALID, INVALID_CODE_MESSAGE),
        ),
        VerifyResult::Expired | VerifyResult::MaxAttemptsExceeded => HttpResponse::BadRequest()
            .json(ErrorResponse::new(
                error_codes::VERIFICATION_CODE_EXPIRED,
                SPENT_CODE_MESSAGE,
            )),
        VerifyResult::Locked { .. } | VerifyResult::RateLimited { .. } => {
            throttled_response(result.retry_after_seconds(now).unwrap_or(1))
        }
    }
}

/// 400 carrying the per-field validation messages
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Request validation failed");
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        response = response.add_detail(field, messages);
    }
    HttpResponse::BadRequest().json(response)
}

/// Error handler for the JSON extractor: malformed bodies get the standard error shape
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let status = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => StatusCode::BAD_REQUEST,
    };
    let response = HttpResponse::build(status).json(ErrorResponse::new(
        error_codes::BAD_REQUEST,
        format!("Malformed request body: {}", err),
    ));
    InternalError::from_response(err, response).into()
}

fn internal_error_response() -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ErrorResponse::new(error_codes::INTERNAL_ERROR, INTERNAL_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use chrono::Duration;
    use sw_core::StorageError;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_throttle_variants_share_one_body() {
        let now = Utc::now();
        let later = now + Duration::seconds(90);

        let responses = vec![
            domain_error_response(&DomainError::RateLimitExceeded { reset_at: later }, now),
            domain_error_response(&DomainError::RateLimited { next_allowed_at: later }, now),
            domain_error_response(&DomainError::Locked { until: later }, now),
            verify_result_response(&VerifyResult::Locked { until: later }, now),
        ];

        for response in responses {
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(
                response.headers().get(header::RETRY_AFTER).unwrap(),
                "90"
            );
            let body = body_json(response).await;
            assert_eq!(body["error"], error_codes::RATE_LIMIT_EXCEEDED);
            assert_eq!(body["message"], THROTTLED_MESSAGE);
        }
    }

    #[actix_web::test]
    async fn test_retry_after_is_at_least_one_second() {
        let now = Utc::now();
        let lapsed = DomainError::Locked {
            until: now - Duration::seconds(5),
        };
        let response = domain_error_response(&lapsed, now);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");

        let response = verify_result_response(
            &VerifyResult::RateLimited {
                next_allowed_at: now - Duration::seconds(5),
            },
            now,
        );
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[actix_web::test]
    async fn test_unknown_and_wrong_codes_are_indistinguishable() {
        let now = Utc::now();
        let invalid = body_json(verify_result_response(&VerifyResult::Invalid, now)).await;
        let missing = body_json(verify_result_response(&VerifyResult::NotFound, now)).await;
        assert_eq!(invalid["error"], missing["error"]);
        assert_eq!(invalid["message"], missing["message"]);

        let expired = body_json(verify_result_response(&VerifyResult::Expired, now)).await;
        let spent =
            body_json(verify_result_response(&VerifyResult::MaxAttemptsExceeded, now)).await;
        assert_eq!(expired["error"], error_codes::VERIFICATION_CODE_EXPIRED);
        assert_eq!(expired["message"], spent["message"]);
    }

    #[actix_web::test]
    async fn test_backend_failures_do_not_leak_details() {
        let now = Utc::now();
        let err = DomainError::Storage(StorageError::unavailable("mysql://secret-host down"));
        let response = domain_error_response(&err, now);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_MESSAGE);

        let response = domain_error_response(
            &DomainError::Delivery {
                message: "relay refused".into(),
            },
            now,
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
