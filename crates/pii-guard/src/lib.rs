//! Field-level protection for personal data in stall-rental records.
//!
//! - [`key`]: resolve the single field key once per process.
//! - [`crypto`]: AES-256-GCM field cipher and the idempotent write guard.
//! - [`record`]: encrypt / decrypt the caller-named fields of a row.
//! - [`display`]: key-less checks that keep ciphertext off the screen.
//! - [`PiiProtector`]: the handle controllers hold.
//!
//! Stored values look like `base64(iv):base64(tag):base64(ciphertext)`.

pub mod crypto;
pub mod display;
pub mod key;
pub mod protector;
pub mod record;

pub use crypto::{CipherError, EncryptedValue, FieldCipher, GuardMode};
pub use key::{KeyError, KeyProvider};
pub use protector::{PiiProtector, ProtectionError};
pub use record::{FieldReport, FieldSet, Record};
