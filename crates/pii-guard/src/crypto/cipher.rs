//! AES-256-GCM encryption and decryption of individual string fields.
//!
//! Every call to [`FieldCipher::encrypt`] draws a fresh 96-bit IV from the OS
//! CSPRNG, so encrypting the same plaintext twice yields two different values.
//! The 128-bit authentication tag is kept detached from the ciphertext so the
//! stored form carries it as its own segment.

use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::key::KeyHandle;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM initialisation vector (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Separator between the three serialized segments.
pub const SEGMENT_SEPARATOR: char = ':';

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// Absence is not encrypted; callers pass empty values through untouched.
    #[error("refusing to encrypt an empty value")]
    EmptyPlaintext,

    /// AES-GCM encryption failed.
    #[error("aead encryption failed")]
    EncryptionFailed,

    /// The tag did not verify, or the recovered plaintext is not UTF-8.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The value is not `iv:tag:ciphertext` with valid base64 segments.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(&'static str),
}

/// A parsed, encrypted field value.
///
/// The string representation is `base64(iv):base64(tag):base64(ciphertext)`
/// using the standard, padded base64 alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedValue {
    /// Raw IV bytes.
    pub iv: [u8; IV_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext bytes (same length as the plaintext).
    pub ciphertext: Vec<u8>,
}

impl EncryptedValue {
    /// Parse a stored field string into an [`EncryptedValue`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedCiphertext`] if the string does not have
    /// exactly three non-empty segments, a segment is not valid base64, or the
    /// IV / tag have the wrong length.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.split(SEGMENT_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(CipherError::MalformedCiphertext("expected three segments"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CipherError::MalformedCiphertext("empty segment"));
        }

        let iv = decode_fixed::<IV_LEN>(parts[0], "invalid iv")?;
        let tag = decode_fixed::<TAG_LEN>(parts[1], "invalid authentication tag")?;
        let ciphertext = STANDARD
            .decode(parts[2])
            .map_err(|_| CipherError::MalformedCiphertext("invalid ciphertext encoding"))?;

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }
}

impl fmt::Display for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            STANDARD.encode(self.iv),
            STANDARD.encode(self.tag),
            STANDARD.encode(&self.ciphertext),
            sep = SEGMENT_SEPARATOR,
        )
    }
}

impl FromStr for EncryptedValue {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn decode_fixed<const N: usize>(
    segment: &str,
    reason: &'static str,
) -> Result<[u8; N], CipherError> {
    let bytes = STANDARD
        .decode(segment)
        .map_err(|_| CipherError::MalformedCiphertext(reason))?;
    bytes
        .try_into()
        .map_err(|_| CipherError::MalformedCiphertext(reason))
}

/// Authenticated encrypt/decrypt of single string values under one key.
///
/// Cheap to clone; holds only the expanded AES key schedule.
#[derive(Clone)]
pub struct FieldCipher {
    aead: Aes256Gcm,
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldCipher([REDACTED])")
    }
}

impl FieldCipher {
    /// Build a cipher from a resolved key handle.
    pub fn new(key: &KeyHandle) -> Self {
        // The handle always carries exactly KEY_LEN bytes.
        Self {
            aead: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.expose())),
        }
    }

    /// Build a cipher from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, CipherError> {
        if key.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength);
        }
        let aead = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)?;
        Ok(Self { aead })
    }

    /// Encrypt a plaintext string under a fresh random IV.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::EmptyPlaintext`] for `""`, and
    /// [`CipherError::EncryptionFailed`] on an internal AEAD error.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::EmptyPlaintext);
        }

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .aead
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(tag.as_slice());

        Ok(EncryptedValue {
            iv,
            tag: tag_bytes,
            ciphertext: buffer,
        })
    }

    /// Parse and decrypt a stored field string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedCiphertext`] if the string cannot be
    /// parsed, and [`CipherError::DecryptionFailed`] if authentication fails.
    pub fn decrypt(&self, value: &str) -> Result<String, CipherError> {
        let parsed = EncryptedValue::parse(value)?;
        self.decrypt_value(&parsed)
    }

    /// Decrypt an already-parsed [`EncryptedValue`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::DecryptionFailed`] on a tag mismatch (wrong key
    /// or tampered data) or when the plaintext is not valid UTF-8.
    pub fn decrypt_value(&self, value: &EncryptedValue) -> Result<String, CipherError> {
        let mut buffer = value.ciphertext.clone();
        self.aead
            .decrypt_in_place_detached(
                Nonce::from_slice(&value.iv),
                b"",
                &mut buffer,
                Tag::from_slice(&value.tag),
            )
            .map_err(|_| CipherError::DecryptionFailed)?;
        String::from_utf8(buffer).map_err(|_| CipherError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_cipher() -> FieldCipher {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        FieldCipher::from_slice(&key).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = random_cipher();
        for plaintext in [
            "J",
            "Jeno Aldrei Laurente",
            "09171234567",
            "Blk 4:Lot 7:Naga City",
            "María Dela Cruz-Ñuñez",
        ] {
            let stored = cipher.encrypt(plaintext).unwrap().to_string();
            assert_eq!(cipher.decrypt(&stored).unwrap(), plaintext);
        }
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let cipher = random_cipher();
        let a = cipher.encrypt("Maria Santos").unwrap().to_string();
        let b = cipher.encrypt("Maria Santos").unwrap().to_string();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), "Maria Santos");
        assert_eq!(cipher.decrypt(&b).unwrap(), "Maria Santos");
    }

    #[test]
    fn serialized_form_has_three_segments() {
        let cipher = random_cipher();
        let stored = cipher.encrypt("hello").unwrap().to_string();
        let parts: Vec<&str> = stored.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(STANDARD.decode(parts[0]).unwrap().len(), IV_LEN);
        assert_eq!(STANDARD.decode(parts[1]).unwrap().len(), TAG_LEN);
        assert_eq!(stored.parse::<EncryptedValue>().unwrap().to_string(), stored);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let stored = random_cipher().encrypt("secret").unwrap().to_string();
        assert!(matches!(
            random_cipher().decrypt(&stored),
            Err(CipherError::DecryptionFailed)
        ));
    }

    #[test]
    fn invalid_key_length_rejected() {
        assert!(matches!(
            FieldCipher::from_slice(&[0u8; 16]),
            Err(CipherError::InvalidKeyLength)
        ));
    }

    #[test]
    fn empty_plaintext_rejected() {
        assert!(matches!(
            random_cipher().encrypt(""),
            Err(CipherError::EmptyPlaintext)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let cipher = random_cipher();
        let original = cipher.encrypt("tamper me").unwrap();
        for i in 0..original.ciphertext.len() {
            let mut value = original.clone();
            value.ciphertext[i] ^= 0x01;
            assert!(matches!(
                cipher.decrypt(&value.to_string()),
                Err(CipherError::DecryptionFailed)
            ));
        }
    }

    #[test]
    fn tampered_tag_fails_auth() {
        let cipher = random_cipher();
        let original = cipher.encrypt("tamper me").unwrap();
        for i in 0..TAG_LEN {
            let mut value = original.clone();
            value.tag[i] ^= 0x80;
            assert!(matches!(
                cipher.decrypt_value(&value),
                Err(CipherError::DecryptionFailed)
            ));
        }
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        assert!(matches!(
            EncryptedValue::parse("abc:def"),
            Err(CipherError::MalformedCiphertext(_))
        ));
        assert!(matches!(
            EncryptedValue::parse("a:b:c:d"),
            Err(CipherError::MalformedCiphertext(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(EncryptedValue::parse("AAAAAAAAAAAAAAAA::AAAA").is_err());
    }

    #[test]
    fn parse_rejects_bad_base64() {
        assert!(EncryptedValue::parse("!!!:abc:def").is_err());
    }

    #[test]
    fn parse_rejects_short_iv() {
        // Valid base64, but decodes to 3 bytes rather than 12.
        let value = format!("YWJj:{}:YWJj", STANDARD.encode([0u8; TAG_LEN]));
        assert!(matches!(
            EncryptedValue::parse(&value),
            Err(CipherError::MalformedCiphertext("invalid iv"))
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        assert_eq!(format!("{:?}", random_cipher()), "FieldCipher([REDACTED])");
    }
}
