//! Idempotent write-path guard: encrypt a value unless it already is ciphertext.
//!
//! [`is_encrypted`] is a format check, not a cryptographic one. A plaintext
//! string that happens to look like `xxx:yyy:zzz` in the base64 alphabet is
//! classified as encrypted under [`GuardMode::Structural`]. Deployments that
//! cannot accept that gap use [`GuardMode::Authenticated`], which also
//! requires the tag to verify under the current key.

use serde::Deserialize;

use super::cipher::{CipherError, FieldCipher, SEGMENT_SEPARATOR};

/// How [`ensure_encrypted`] decides that a value is already ciphertext.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Shape check only: three non-empty base64-alphabet segments.
    #[default]
    Structural,
    /// Shape check plus a successful authenticated decryption.
    Authenticated,
}

/// Returns `true` for characters of the standard base64 alphabet, padding included.
pub(crate) fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Structural check for the `iv:tag:ciphertext` shape.
///
/// Does not decode the segments or verify the tag.
pub fn is_encrypted(value: &str) -> bool {
    let mut segments = 0;
    for segment in value.split(SEGMENT_SEPARATOR) {
        segments += 1;
        if segments > 3 || segment.is_empty() || !segment.chars().all(is_base64_char) {
            return false;
        }
    }
    segments == 3
}

/// Return `value` unchanged if it is already encrypted (per `mode`), otherwise
/// encrypt it. Empty values pass through unchanged.
///
/// Applying this twice has the same effect as applying it once.
///
/// # Errors
///
/// Propagates [`CipherError`] from [`FieldCipher::encrypt`].
pub fn ensure_encrypted(
    cipher: &FieldCipher,
    value: &str,
    mode: GuardMode,
) -> Result<String, CipherError> {
    if value.is_empty() || already_encrypted(cipher, value, mode) {
        return Ok(value.to_owned());
    }
    Ok(cipher.encrypt(value)?.to_string())
}

/// [`ensure_encrypted`] for optional values; `None` stays `None`.
///
/// # Errors
///
/// Propagates [`CipherError`] from [`FieldCipher::encrypt`].
pub fn ensure_encrypted_opt(
    cipher: &FieldCipher,
    value: Option<&str>,
    mode: GuardMode,
) -> Result<Option<String>, CipherError> {
    value
        .map(|v| ensure_encrypted(cipher, v, mode))
        .transpose()
}

fn already_encrypted(cipher: &FieldCipher, value: &str, mode: GuardMode) -> bool {
    if !is_encrypted(value) {
        return false;
    }
    match mode {
        GuardMode::Structural => true,
        GuardMode::Authenticated => cipher.decrypt(value).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::from_slice(&[0x42u8; 32]).unwrap()
    }

    #[test]
    fn shape_check() {
        assert!(is_encrypted("abc:def:ghi"));
        assert!(is_encrypted("YWJj+/==:ZGVm:Z2hp"));
        assert!(!is_encrypted("abc:def"));
        assert!(!is_encrypted("abc:def:ghi:jkl"));
        assert!(!is_encrypted("abc::ghi"));
        assert!(!is_encrypted("abc:d f:ghi"));
        assert!(!is_encrypted("Juan Dela Cruz"));
        assert!(!is_encrypted(""));
    }

    #[test]
    fn real_ciphertext_is_encrypted() {
        let stored = cipher().encrypt("Maria Santos").unwrap().to_string();
        assert!(is_encrypted(&stored));
    }

    #[test]
    fn ensure_encrypts_plaintext() {
        let c = cipher();
        let out = ensure_encrypted(&c, "Maria Santos", GuardMode::Structural).unwrap();
        assert_ne!(out, "Maria Santos");
        assert!(is_encrypted(&out));
        assert_eq!(c.decrypt(&out).unwrap(), "Maria Santos");
    }

    #[test]
    fn ensure_is_idempotent() {
        let c = cipher();
        for mode in [GuardMode::Structural, GuardMode::Authenticated] {
            for input in ["Jeno Aldrei Laurente", "a", "Purok 3: Bagumbayan"] {
                let once = ensure_encrypted(&c, input, mode).unwrap();
                let twice = ensure_encrypted(&c, &once, mode).unwrap();
                assert_eq!(once, twice);
                assert_eq!(c.decrypt(&twice).unwrap(), input);
            }
        }
    }

    #[test]
    fn empty_and_absent_pass_through() {
        let c = cipher();
        assert_eq!(ensure_encrypted(&c, "", GuardMode::Structural).unwrap(), "");
        assert_eq!(
            ensure_encrypted_opt(&c, None, GuardMode::Structural).unwrap(),
            None
        );
    }

    #[test]
    fn structural_mode_skips_lookalike_plaintext() {
        let c = cipher();
        let out = ensure_encrypted(&c, "abc:def:ghi", GuardMode::Structural).unwrap();
        assert_eq!(out, "abc:def:ghi");
    }

    #[test]
    fn authenticated_mode_encrypts_lookalike_plaintext() {
        let c = cipher();
        let out = ensure_encrypted(&c, "abc:def:ghi", GuardMode::Authenticated).unwrap();
        assert_ne!(out, "abc:def:ghi");
        assert_eq!(c.decrypt(&out).unwrap(), "abc:def:ghi");
    }

    #[test]
    fn guard_mode_deserialises_lowercase() {
        let mode: GuardMode = serde_json::from_str("\"authenticated\"").unwrap();
        assert_eq!(mode, GuardMode::Authenticated);
        assert_eq!(GuardMode::default(), GuardMode::Structural);
    }
}
