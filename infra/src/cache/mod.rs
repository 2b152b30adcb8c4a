//! Cache module for Redis-based rate counters
//!
//! This module provides the Redis connection wrapper and the fixed-window
//! `RateLimitStore` used by route and issuance throttling.

pub mod rate_limit_store;
pub mod redis_client;


pub use rate_limit_store::RedisRateLimitStore;
pub use redis_client::RedisClient;
