//! Verification code endpoints
//!
//! - `POST /api/v1/auth/send-code` issues a code and hands it to delivery
//! - `POST /api/v1/auth/verify-code` checks a submitted code

pub mod send_code;
pub mod verify_code;
