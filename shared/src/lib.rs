//! Shared utilities and common types for the Slotwise server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and layered loading
//! - Error response structures
//! - Identity utilities (normalization, masking for logs)
//! - API response wrappers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CleanupConfig, CodeCharset, ConfigError, DatabaseConfig,
    DeliveryConfig, DeliveryProvider, Environment, LockoutConfig, LogFormat, LoggingConfig,
    RateLimitConfig, ServerConfig, StorageBackend, StorageConfig, VerificationConfig,
    WindowLimit, MAX_CODE_LENGTH, MAX_POLICY_MINUTES, MAX_WINDOW_SECONDS, MIN_CODE_LENGTH,
};
pub use errors::{error_codes, ApiResult, ErrorResponse};
pub use types::{ApiResponse, HealthResponse, HealthStatus, ServiceHealth};
pub use utils::identity;
