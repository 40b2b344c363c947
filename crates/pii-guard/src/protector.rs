//! [`PiiProtector`]: the entry point business code holds on to.
//!
//! Bundles the injected [`KeyProvider`] with the write-guard mode so that
//! callers only ever deal with plaintext strings, stored strings, and rows.

use thiserror::Error;

use crate::crypto::{self, CipherError, FieldCipher, GuardMode};
use crate::key::{KeyError, KeyProvider};
use crate::record::{self, FieldReport, FieldSet, Record};

/// Errors surfaced by [`PiiProtector`].
#[derive(Debug, Error)]
pub enum ProtectionError {
    /// The field key could not be resolved.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A cipher operation failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Cheaply cloneable handle over the key provider and guard mode.
#[derive(Clone, Debug)]
pub struct PiiProtector {
    keys: KeyProvider,
    mode: GuardMode,
}

impl PiiProtector {
    pub fn new(keys: KeyProvider, mode: GuardMode) -> Self {
        Self { keys, mode }
    }

    pub fn guard_mode(&self) -> GuardMode {
        self.mode
    }

    /// Returns `true` once the key has been resolved.
    pub fn is_ready(&self) -> bool {
        self.keys.is_ready()
    }

    /// Resolve the key now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError::Key`] if no key can be resolved.
    pub async fn warm_up(&self) -> Result<(), ProtectionError> {
        self.keys.key().await?;
        Ok(())
    }

    /// A [`FieldCipher`] bound to the process key.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError::Key`] if no key can be resolved.
    pub async fn cipher(&self) -> Result<FieldCipher, ProtectionError> {
        let key = self.keys.key().await?;
        Ok(FieldCipher::new(&key))
    }

    /// Encrypt a plaintext value into its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError`] if the key is unavailable or encryption fails.
    pub async fn encrypt(&self, plaintext: &str) -> Result<String, ProtectionError> {
        Ok(self.cipher().await?.encrypt(plaintext)?.to_string())
    }

    /// Decrypt a stored value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError::Cipher`] for malformed or unauthentic input.
    pub async fn decrypt(&self, stored: &str) -> Result<String, ProtectionError> {
        Ok(self.cipher().await?.decrypt(stored)?)
    }

    /// Encrypt `value` unless it already is ciphertext. Empty and absent
    /// values pass through.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError`] if the key is unavailable or encryption fails.
    pub async fn ensure_encrypted(
        &self,
        value: Option<&str>,
    ) -> Result<Option<String>, ProtectionError> {
        let cipher = self.cipher().await?;
        Ok(crypto::ensure_encrypted_opt(&cipher, value, self.mode)?)
    }

    /// Write path: protect the named fields of `record` before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError`] if the key is unavailable or any field
    /// fails to encrypt.
    pub async fn encrypt_fields(
        &self,
        record: &mut Record,
        fields: &FieldSet,
    ) -> Result<usize, ProtectionError> {
        let cipher = self.cipher().await?;
        Ok(record::encrypt_fields(&cipher, record, fields, self.mode)?)
    }

    /// Read path: decrypt the named fields of `record` before it leaves the API.
    ///
    /// # Errors
    ///
    /// Only a missing key is an error; per-field failures are reported in the
    /// returned [`FieldReport`].
    pub async fn decrypt_fields(
        &self,
        record: &mut Record,
        fields: &FieldSet,
    ) -> Result<FieldReport, ProtectionError> {
        let cipher = self.cipher().await?;
        Ok(record::decrypt_fields(&cipher, record, fields))
    }

    /// [`Self::decrypt_fields`] over a batch of rows.
    ///
    /// # Errors
    ///
    /// Only a missing key is an error.
    pub async fn decrypt_rows(
        &self,
        rows: &mut [Record],
        fields: &FieldSet,
    ) -> Result<FieldReport, ProtectionError> {
        let cipher = self.cipher().await?;
        Ok(record::decrypt_rows(&cipher, rows, fields))
    }
}
