//! Domain entities representing core business objects.

pub mod lockout;
pub mod rate_limit_counter;
pub mod verification_code;

// Re-export commonly used types
pub use lockout::{LockoutPolicy, LockoutState};
pub use rate_limit_counter::RateLimitCounter;
pub use verification_code::{CodeStatus, VerificationCode};
