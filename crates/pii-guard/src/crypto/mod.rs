//! AES-256-GCM field encryption primitives and the idempotent write guard.
//!
//! This module performs no I/O. The key is handed in by the caller.
//!
//! # Ciphertext format
//!
//! ```text
//! <base64(iv)>:<base64(auth tag)>:<base64(ciphertext)>
//! ```
//!
//! This triplet is the only persisted representation of a protected field.

pub mod cipher;
pub mod guard;

pub use cipher::{CipherError, EncryptedValue, FieldCipher, KEY_LEN};
pub use guard::{ensure_encrypted, ensure_encrypted_opt, is_encrypted, GuardMode};
