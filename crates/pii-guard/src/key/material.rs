//! [`KeyMaterial`]: the in-memory holder for the field encryption key.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use super::KeyError;
use crate::crypto::KEY_LEN;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
pub struct KeyMaterial(Box<[u8; KEY_LEN]>);

/// Shared, opaque handle to the resolved key. Only the cipher reads the bytes.
pub type KeyHandle = Arc<KeyMaterial>;

impl KeyMaterial {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Turn a configured secret string into key material.
    ///
    /// The secret is interpreted, in order, as 64 hex characters, as base64
    /// decoding to exactly 32 bytes, or as a passphrase hashed with SHA-256.
    /// Returns `None` for an empty or whitespace-only secret.
    pub fn from_secret(secret: &str) -> Option<Self> {
        let secret = secret.trim();
        if secret.is_empty() {
            return None;
        }

        if secret.len() == KEY_LEN * 2 {
            if let Ok(bytes) = hex::decode(secret) {
                return Self::from_bytes(&bytes).ok();
            }
        }
        if let Ok(bytes) = STANDARD.decode(secret) {
            if bytes.len() == KEY_LEN {
                return Self::from_bytes(&bytes).ok();
            }
        }

        let digest = Sha256::digest(secret.as_bytes());
        Self::from_bytes(digest.as_slice()).ok()
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn hex_secret_is_raw_key() {
        let key = KeyMaterial::from_secret(HEX_KEY).unwrap();
        assert_eq!(key.expose()[0], 0x00);
        assert_eq!(key.expose()[31], 0x1f);
    }

    #[test]
    fn base64_secret_is_raw_key() {
        let encoded = STANDARD.encode([0x07u8; KEY_LEN]);
        let key = KeyMaterial::from_secret(&encoded).unwrap();
        assert_eq!(key.expose(), &[0x07u8; KEY_LEN]);
    }

    #[test]
    fn passphrase_is_hashed() {
        let a = KeyMaterial::from_secret("stall-rental-passphrase").unwrap();
        let b = KeyMaterial::from_secret("  stall-rental-passphrase ").unwrap();
        let expected = Sha256::digest(b"stall-rental-passphrase");
        assert_eq!(a.expose().as_slice(), expected.as_slice());
        assert_eq!(a.expose(), b.expose());
    }

    #[test]
    fn blank_secret_is_absent() {
        assert!(KeyMaterial::from_secret("").is_none());
        assert!(KeyMaterial::from_secret("   ").is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            KeyMaterial::from_bytes(&[0u8; 16]),
            Err(KeyError::InvalidLength(16))
        ));
    }

    #[test]
    fn redacted_in_debug() {
        let key = KeyMaterial::from_bytes(&[0xFFu8; KEY_LEN]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
