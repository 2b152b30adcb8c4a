//! Business services containing domain logic and use cases.

pub mod cleanup;
pub mod clock;
pub mod lockout;
pub mod rate_limit;
pub mod verification;

// Re-export commonly used types
pub use cleanup::{CleanupResult, CleanupService};
pub use clock::{seconds_until, Clock, ManualClock, SystemClock};
pub use lockout::{AdmitResult, IdentityLockoutTracker};
pub use rate_limit::{RateLimitDecision, RateLimiter, RouteClass};
pub use verification::{
    AccountConfirmation, CodeDelivery, CodeDispatch, CodeIssuer, CodeMessage, CodeVerifier,
    IssuedCode, VerificationComponents, VerificationService, VerificationServiceConfig,
    VerifyResult,
};
