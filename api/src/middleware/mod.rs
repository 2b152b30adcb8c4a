//! Middleware components for the API

pub mod rate_limit;

pub use rate_limit::{extract_client_ip, route_class_for, RouteRateLimit};
