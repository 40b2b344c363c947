//! Field-level encryption and decryption of fetched rows.
//!
//! A record is a JSON object (column name → value). The caller names the
//! protected columns with a [`FieldSet`]; this module has no entity schema of
//! its own. Decryption failures stay local to the field that failed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::crypto::{ensure_encrypted, is_encrypted, CipherError, FieldCipher, GuardMode};

/// A row as handed over by the storage layer.
pub type Record = Map<String, Value>;

/// Ordered, de-duplicated list of column names that hold protected values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FieldSet(Vec<String>);

impl FieldSet {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !out.contains(&field) {
                out.push(field);
            }
        }
        Self(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for FieldSet {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

impl From<FieldSet> for Vec<String> {
    fn from(set: FieldSet) -> Self {
        set.0
    }
}

impl<'a> From<&'a [&'a str]> for FieldSet {
    fn from(fields: &'a [&'a str]) -> Self {
        Self::new(fields.iter().copied())
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// What happened to the named fields of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    /// Fields whose ciphertext was replaced by plaintext.
    pub decrypted: usize,
    /// Fields absent, non-string, empty, or not shaped like ciphertext.
    pub untouched: usize,
    /// Fields that looked encrypted but did not decrypt. Values left as-is.
    pub failed: Vec<String>,
}

impl FieldReport {
    fn merge(&mut self, other: FieldReport) {
        self.decrypted += other.decrypted;
        self.untouched += other.untouched;
        self.failed.extend(other.failed);
    }
}

/// Decrypt every field in `fields` that holds ciphertext, in place.
///
/// Never fails. A field that does not decrypt keeps its original value and is
/// listed in [`FieldReport::failed`]. Keys not named in `fields` are not read.
pub fn decrypt_fields(cipher: &FieldCipher, record: &mut Record, fields: &FieldSet) -> FieldReport {
    let mut report = FieldReport::default();

    for name in fields.iter() {
        let Some(Value::String(current)) = record.get_mut(name) else {
            report.untouched += 1;
            continue;
        };
        if current.is_empty() || !is_encrypted(current) {
            report.untouched += 1;
            continue;
        }

        match cipher.decrypt(current) {
            Ok(plaintext) => {
                *current = plaintext;
                report.decrypted += 1;
            }
            Err(e) => {
                debug!(field = name, error = %e, "field left undecrypted");
                report.failed.push(name.to_owned());
            }
        }
    }

    report
}

/// [`decrypt_fields`] over a batch of rows, returning the combined report.
pub fn decrypt_rows(cipher: &FieldCipher, rows: &mut [Record], fields: &FieldSet) -> FieldReport {
    rows.iter_mut()
        .fold(FieldReport::default(), |mut acc, row| {
            acc.merge(decrypt_fields(cipher, row, fields));
            acc
        })
}

/// Apply [`ensure_encrypted`] to every non-empty string field in `fields`.
///
/// Returns the number of fields that now hold ciphertext they did not hold
/// before. Non-string and absent fields are left alone.
///
/// # Errors
///
/// Returns the first [`CipherError`]. The write must then be abandoned, since
/// the record may be partially encrypted.
pub fn encrypt_fields(
    cipher: &FieldCipher,
    record: &mut Record,
    fields: &FieldSet,
    mode: GuardMode,
) -> Result<usize, CipherError> {
    let mut encrypted = 0;
    for name in fields.iter() {
        if let Some(Value::String(current)) = record.get_mut(name) {
            let protected = ensure_encrypted(cipher, current, mode)?;
            if protected != *current {
                *current = protected;
                encrypted += 1;
            }
        }
    }
    Ok(encrypted)
}
