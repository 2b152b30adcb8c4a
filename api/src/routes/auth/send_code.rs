use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use sw_core::{
    AccountConfirmation, CodeDelivery, LockoutRepository, RateLimitStore,
    VerificationCodeRepository,
};
use sw_shared::{identity::mask_identity, ApiResponse};

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::{domain_error_response, validation_error_response};

/// Handler for POST /api/v1/auth/send-code
///
/// # Request Body
///
/// ```json
/// {
///     "identity": "alice@example.com",
///     "purpose": "signup"
/// }
/// ```
///
/// # Responses
///
/// - `200` code issued and delivered, body carries `expires_in` seconds
/// - `400` malformed identity or unknown purpose
/// - `429` issuance ceiling reached or identity locked, with `Retry-After`
/// - `503` delivery collaborator failed
pub async fn send_code<C, L, S, D, A>(
    state: web::Data<AppState<C, L, S, D, A>>,
    request: web::Json<SendCodeRequest>,
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

    info!(
        event = "send_code_requested",
        identity = %mask_identity(&request.identity),
        purpose = %request.purpose,
        "Verification code requested"
    );

    match state
        .verification
        .request_code(&request.identity, request.purpose)
        .await
    {
        Ok(dispatch) => {
            let now = state.clock.now();
            HttpResponse::Ok().json(ApiResponse::success(SendCodeResponse {
                message: "Verification code sent".to_string(),
                expires_in: (dispatch.expires_at - now).num_seconds().max(0),
            }))
        }
        Err(e) => domain_error_response(&e, state.clock.now()),
    }
}
