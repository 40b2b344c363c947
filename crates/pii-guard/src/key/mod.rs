//! Field key resolution, memoization, and the opaque in-memory key holder.
//!
//! # Lifecycle
//!
//! 1. The host builds a [`KeyProvider`] with its [`KeySource`]s in priority
//!    order (configured secret, then the database key record).
//! 2. The first call to [`KeyProvider::key`] walks the sources and derives a
//!    [`KeyMaterial`] from the first secret found.
//! 3. Every later call returns the same [`KeyHandle`] for the lifetime of the
//!    provider. There is no rotation.
//!
//! # Security invariants
//!
//! - Key bytes are never logged, formatted, or returned outside this crate.
//! - A missing key is a hard error. No fallback key is ever fabricated.

pub mod material;
pub mod provider;
pub mod source;

pub use material::{KeyHandle, KeyMaterial};
pub use provider::KeyProvider;
#[cfg(feature = "database")]
pub use source::DatabaseKeySource;
pub use source::{ConfiguredKeySource, KeySource};

use thiserror::Error;

use crate::crypto::KEY_LEN;

/// Errors produced by the key layer.
#[derive(Debug, Error)]
pub enum KeyError {
    /// No source produced a usable secret.
    #[error("encryption key unavailable: {0}")]
    Unavailable(String),

    /// A configured source could not be read.
    #[error("key source '{source_name}' failed: {reason}")]
    Source {
        source_name: &'static str,
        reason: String,
    },

    /// Raw key material has an unexpected length.
    #[error("key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}
