//! Verification code lifecycle
//!
//! This module provides the code workflow for account confirmation flows:
//! - Code generation, salted hashing and storage (`CodeIssuer`)
//! - Verification with attempt tracking and at-most-once consumption (`CodeVerifier`)
//! - A facade wiring both to delivery and account collaborators (`VerificationService`)

mod components;
mod config;
mod issuer;
pub mod secret;
mod service;
mod traits;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use components::VerificationComponents;
pub use config::VerificationServiceConfig;
pub use issuer::CodeIssuer;
pub use service::VerificationService;
pub use traits::{AccountConfirmation, CodeDelivery, CodeMessage};
pub use types::{CodeDispatch, IssuedCode, VerifyResult};
pub use verifier::CodeVerifier;
