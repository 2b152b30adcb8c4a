//! Verification code DTOs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use sw_core::Purpose;
use sw_shared::config::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use sw_shared::identity::is_valid_email;

/// Request body for POST /api/v1/auth/send-code
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendCodeRequest {
    /// Account e-mail the code is sent to
    #[validate(custom = "validate_identity")]
    pub identity: String,

    pub purpose: Purpose,
}

/// Response body for a dispatched code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendCodeResponse {
    pub message: String,

    /// Seconds until the code expires
    pub expires_in: i64,
}

/// Request body for POST /api/v1/auth/verify-code
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(custom = "validate_identity")]
    pub identity: String,

    pub purpose: Purpose,

    #[validate(custom = "validate_code_length")]
    pub code: String,
}

/// Response body for an accepted code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    if is_valid_email(identity) {
        Ok(())
    } else {
        let mut error = ValidationError::new("identity");
        error.message = Some("Identity must be a valid e-mail address".into());
        Err(error)
    }
}

/// Accepts exactly the lengths the issuer may be configured to produce
fn validate_code_length(code: &str) -> Result<(), ValidationError> {
    if (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.chars().count()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("length");
        error.message = Some(
            format!(
                "Code must be {}-{} characters",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH
            )
            .into(),
        );
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_code_request_validation() {
        let valid: SendCodeRequest =
            serde_json::from_str(r#"{"identity": " Alice@Example.com ", "purpose": "signup"}"#)
                .unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.purpose, Purpose::Signup);

        let invalid = SendCodeRequest {
            identity: "not-an-address".to_string(),
            purpose: Purpose::PasswordReset,
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("identity"));
    }

    #[test]
    fn test_unknown_purpose_is_rejected_by_deserialization() {
        let result: Result<SendCodeRequest, _> =
            serde_json::from_str(r#"{"identity": "alice@example.com", "purpose": "login"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_code_request_length_bounds() {
        let mut request = VerifyCodeRequest {
            identity: "alice@example.com".to_string(),
            purpose: Purpose::EmailChange,
            code: "123456".to_string(),
        };
        assert!(request.validate().is_ok());

        request.code = "1".repeat(MIN_CODE_LENGTH - 1);
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));

        request.code = "1".repeat(MAX_CODE_LENGTH + 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_every_configurable_code_length_is_accepted() {
        let mut config = sw_shared::AppConfig::development();
        for length in MIN_CODE_LENGTH..=MAX_CODE_LENGTH {
            config.verification.code_length = length;
            assert!(config.validate().is_ok());

            let request = VerifyCodeRequest {
                identity: "alice@example.com".to_string(),
                purpose: Purpose::Signup,
                code: "7".repeat(length),
            };
            assert!(request.validate().is_ok(), "length {} rejected", length);
        }
    }
}
