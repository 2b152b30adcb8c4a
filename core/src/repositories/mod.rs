//! Storage ports and their in-memory adapters.

pub mod lockout;
pub mod rate_limit;
pub mod verification_code;

pub use lockout::{InMemoryLockoutRepository, LockoutRepository};
pub use rate_limit::{InMemoryRateLimitStore, RateLimitStore};
pub use verification_code::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
