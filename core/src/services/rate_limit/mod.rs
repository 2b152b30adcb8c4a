//! Fixed-window rate limiting keyed by arbitrary tokens
//!
//! Used directly by the HTTP layer (per origin address and route class) and
//! by the code issuer (per purpose and identity).

mod service;
mod types;

pub use service::RateLimiter;
pub use types::{RateLimitDecision, RouteClass};
