//! Common types, protocol definitions, and errors shared by the PII protection crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
