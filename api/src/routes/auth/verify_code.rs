use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use sw_core::{
    AccountConfirmation, CodeDelivery, LockoutRepository, RateLimitStore,
    VerificationCodeRepository,
};
use sw_shared::identity::mask_identity;

use crate::app::AppState;
use crate::dto::VerifyCodeRequest;
use crate::handlers::{domain_error_response, validation_error_response, verify_result_response};

/// Handler for POST /api/v1/auth/verify-code
///
/// An unknown identity and a wrong code produce the same `400` body. Expired
/// and exhausted codes share a body asking for a new code. Lockouts answer
/// `429` with `Retry-After`.
pub async fn verify_code<C, L, S, D, A>(
    state: web::Data<AppState<C, L, S, D, A>>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse
where
    C: VerificationCodeRepository + 'static,
    L: LockoutRepository + 'static,
    S: RateLimitStore + 'static,
    D: CodeDelivery + 'static,
    A: AccountConfirmation + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let outcome = state
        .verification
        .confirm_code(&request.identity, request.purpose, &request.code)
        .await;
    let now = state.clock.now();

    match outcome {
        Ok(result) => {
            info!(
                event = "verify_code_completed",
                identity = %mask_identity(&request.identity),
                purpose = %request.purpose,
                accepted = result.is_ok(),
                "Verification code checked"
            );
            verify_result_response(&result, now)
        }
        Err(e) => domain_error_response(&e, now),
    }
}
