//! Key-less check for values that should not be shown to a person.
//!
//! [`looks_encrypted`] is broader than [`crate::crypto::is_encrypted`]: it
//! also flags control characters and long runs of base64 text, and ignores
//! surrounding whitespace for the shape checks. The long-run rule has known false positives (a long
//! alphanumeric reference code is treated as encrypted and replaced by the
//! fallback). That trade-off is accepted; the threshold is not tuned further.

use crate::crypto::guard::is_base64_char;
use crate::crypto::is_encrypted;

/// Strings longer than this, made only of base64 characters and `:`, are
/// treated as ciphertext.
pub const LONG_BASE64_THRESHOLD: usize = 50;

/// Returns `true` if `value` looks like ciphertext or binary noise.
pub fn looks_encrypted(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if value.chars().any(char::is_control) {
        return true;
    }
    let trimmed = value.trim();
    if is_encrypted(trimmed) {
        return true;
    }
    trimmed.chars().count() > LONG_BASE64_THRESHOLD
        && trimmed.chars().all(|c| c == ':' || is_base64_char(c))
}

/// Returns `value` if it is safe to render, otherwise `fallback`.
///
/// Absent, blank, `"null"` and `"undefined"` values, and anything that
/// [`looks_encrypted`], yield the fallback.
pub fn safe_display_value(value: Option<&str>, fallback: &str) -> String {
    match displayable(value) {
        Some(v) => v.to_owned(),
        None => fallback.to_owned(),
    }
}

/// The value itself if it can be shown, `None` otherwise.
pub(crate) fn displayable(value: Option<&str>) -> Option<&str> {
    let v = value?;
    let trimmed = v.trim();
    if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" || looks_encrypted(v) {
        return None;
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplet_shape_looks_encrypted() {
        assert!(looks_encrypted("abc:def:ghi"));
        assert!(looks_encrypted(
            "q83vEjRWeJASNFZ4:3q2+7wAAAAAAAAAAAAAAAA==:TWFyaWEgU2FudG9z"
        ));
    }

    #[test]
    fn names_do_not_look_encrypted() {
        assert!(!looks_encrypted("Juan Dela Cruz"));
        assert!(!looks_encrypted("María Dela Cruz-Ñuñez"));
        assert!(!looks_encrypted("09171234567"));
        assert!(!looks_encrypted("jeno@example.com"));
        assert!(!looks_encrypted(""));
    }

    #[test]
    fn control_characters_look_encrypted() {
        assert!(looks_encrypted("Mar\u{0}ia"));
        assert!(looks_encrypted("\u{1b}[31mred"));
        assert!(looks_encrypted("abc\u{7f}"));
        assert!(looks_encrypted("x\u{85}y"));
        assert!(looks_encrypted("Purok 3\nBagumbayan"));
        assert!(looks_encrypted("tab\tseparated"));
    }

    #[test]
    fn padded_ciphertext_looks_encrypted() {
        let stored = "q83vEjRWeJASNFZ4:3q2+7wAAAAAAAAAAAAAAAA==:TWFyaWEgU2FudG9z";
        assert!(looks_encrypted(&format!("{stored}\n")));
        assert!(looks_encrypted(&format!("{stored}\r\n")));
        assert!(looks_encrypted(&format!("  {stored}  ")));
        assert_eq!(safe_display_value(Some(&format!("{stored}\n")), "User"), "User");
        assert_eq!(safe_display_value(Some(&format!(" {stored} ")), "User"), "User");
    }

    #[test]
    fn padded_long_base64_run_looks_encrypted() {
        let run = format!("  {}  ", "QUJD".repeat(15));
        assert!(looks_encrypted(&run));
        assert_eq!(safe_display_value(Some(&run), "User"), "User");
    }

    #[test]
    fn long_base64_run_looks_encrypted() {
        let sixty = "A".repeat(30) + &"b9".repeat(15);
        assert_eq!(sixty.len(), 60);
        assert!(looks_encrypted(&sixty));
        let with_colons = "QUJD".repeat(10) + ":" + &"REVG".repeat(5);
        assert!(looks_encrypted(&with_colons));
    }

    #[test]
    fn short_base64_run_is_fine() {
        let fifty = "A".repeat(LONG_BASE64_THRESHOLD);
        assert!(!looks_encrypted(&fifty));
    }

    #[test]
    fn long_text_with_spaces_is_fine() {
        let sentence = "Stall 14 near the fish section, second row, beside the market office";
        assert!(sentence.len() > LONG_BASE64_THRESHOLD);
        assert!(!looks_encrypted(sentence));
    }

    #[test]
    fn safe_display_fallbacks() {
        assert_eq!(safe_display_value(Some("abc:def:ghi"), "User"), "User");
        assert_eq!(safe_display_value(Some("Maria Santos"), "User"), "Maria Santos");
        assert_eq!(safe_display_value(None, "User"), "User");
        assert_eq!(safe_display_value(Some(""), "User"), "User");
        assert_eq!(safe_display_value(Some("   "), "User"), "User");
        assert_eq!(safe_display_value(Some("null"), "User"), "User");
        assert_eq!(safe_display_value(Some("undefined"), "User"), "User");
    }
}
