//! # Slotwise Core
//!
//! Core business logic for the verification-code lifecycle and abuse
//! throttling: domain entities, storage ports with in-memory adapters, the
//! rate limiter, the identity lockout tracker, the code issuer and verifier,
//! and the maintenance service.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{CodeStatus, LockoutPolicy, LockoutState, RateLimitCounter, VerificationCode};
pub use domain::value_objects::{Identity, Purpose};
pub use errors::{DomainError, DomainResult, StorageError, StorageResult};
pub use repositories::{
    InMemoryLockoutRepository, InMemoryRateLimitStore, InMemoryVerificationCodeRepository,
    LockoutRepository, RateLimitStore, VerificationCodeRepository,
};
pub use services::*;
