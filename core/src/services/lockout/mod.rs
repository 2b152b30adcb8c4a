//! Per-identity lockout tracking shared by issuance and verification

mod tracker;

pub use tracker::{AdmitResult, IdentityLockoutTracker};

#[cfg(test)]
mod tests;
