//! Flow a verification code is bound to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Account flow a code was issued for
///
/// Codes for different purposes never satisfy each other, even for the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Signup,
    EmailChange,
    PasswordReset,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Signup, Purpose::EmailChange, Purpose::PasswordReset];

    /// Stable storage and key representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Signup => "signup",
            Purpose::EmailChange => "email_change",
            Purpose::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(Purpose::Signup),
            "email_change" => Ok(Purpose::EmailChange),
            "password_reset" => Ok(Purpose::PasswordReset),
            other => Err(DomainError::validation(format!("Unknown purpose: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_string_forms_agree() {
        for purpose in Purpose::ALL {
            assert_eq!(purpose.as_str().parse::<Purpose>().unwrap(), purpose);
            let json = serde_json::to_string(&purpose).unwrap();
            assert_eq!(json, format!("\"{}\"", purpose.as_str()));
        }
    }

    #[test]
    fn test_unknown_purpose_is_validation_error() {
        assert!(matches!(
            "login".parse::<Purpose>(),
            Err(DomainError::Validation { .. })
        ));
    }
}
