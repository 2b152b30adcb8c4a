//! Identity (account e-mail) utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic address shape check; deliverability is the mail relay's problem
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$").expect("valid regex")
});

/// Normalize an identity: surrounding whitespace trimmed, lower-cased
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Check if an identity is a well-formed e-mail address (after normalization)
pub fn is_valid_email(identity: &str) -> bool {
    EMAIL_REGEX.is_match(&normalize_identity(identity))
}

/// Mask an identity for logs (e.g., al***@example.com)
pub fn mask_identity(identity: &str) -> String {
    let normalized = normalize_identity(identity);
    match normalized.split_once('@') {
        Some((local, domain)) => {
            let keep = if local.chars().count() > 2 { 2 } else { 1 };
            let visible: String = local.chars().take(keep).collect();
            format!("{}***@{}", visible, domain)
        }
        None => {
            let chars: Vec<char> = normalized.chars().collect();
            if chars.len() >= 6 {
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 2..].iter().collect();
                format!("{}***{}", head, tail)
            } else {
                "***".to_string()
            }
        }
    }
}
