//! Value objects representing immutable domain concepts.

pub mod identity;
pub mod purpose;

pub use identity::Identity;
pub use purpose::Purpose;
