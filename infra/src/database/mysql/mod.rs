//! MySQL repository implementations

pub mod lockout_repository_impl;
pub mod verification_code_repository_impl;

pub use lockout_repository_impl::MySqlLockoutRepository;
pub use verification_code_repository_impl::MySqlVerificationCodeRepository;
