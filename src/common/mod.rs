//! Shared error and domain types.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
