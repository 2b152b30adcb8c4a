//! Common utility functions

pub mod identity;

pub use identity::*;
