//! Slotwise API Library
//!
//! HTTP surface for the verification-code subsystem: request/response DTOs,
//! route handlers, the per-origin rate limit middleware and the application
//! factory shared by the binary and the integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
