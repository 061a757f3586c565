//! Common types, protocol definitions, and errors shared across `field-guard` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
