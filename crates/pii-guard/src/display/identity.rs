//! Typed user / staff identities and the safe name and contact pickers.
//!
//! Backend payloads reach the UI in several shapes (`full_name` or
//! `fullName`, staff nested under a `staff` key or not). [`UserDisplayInfo`]
//! and [`StaffDisplayInfo`] absorb those shapes once; the pickers then walk a
//! fixed preference order and return the first candidate that can be shown.

use serde_json::{Map, Value};

use super::heuristic::displayable;

/// Name and contact fields of an applicant / stallholder account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDisplayInfo {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
}

/// Name and contact fields of a staff / inspector / collector account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffDisplayInfo {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
}

const FULL_NAME_KEYS: &[&str] = &["full_name", "fullName", "name"];
const FIRST_NAME_KEYS: &[&str] = &["first_name", "firstName"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "lastName"];
const USERNAME_KEYS: &[&str] = &["username", "user_name", "userName"];
const EMAIL_KEYS: &[&str] = &["email", "email_address", "emailAddress"];
const CONTACT_KEYS: &[&str] = &[
    "contact_number",
    "contactNumber",
    "contact_no",
    "phone",
    "phone_number",
    "phoneNumber",
];

/// First string value among `keys`; non-string values are ignored.
fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str).map(str::to_owned))
}

impl UserDisplayInfo {
    /// Build from a loosely-shaped JSON value. Anything that is not an object
    /// yields an empty identity.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            full_name: text(obj, FULL_NAME_KEYS),
            first_name: text(obj, FIRST_NAME_KEYS),
            last_name: text(obj, LAST_NAME_KEYS),
            username: text(obj, USERNAME_KEYS),
            email: text(obj, EMAIL_KEYS),
            contact_number: text(obj, CONTACT_KEYS),
        }
    }
}

impl StaffDisplayInfo {
    /// Build from a loosely-shaped JSON value, unwrapping `{ "staff": { .. } }`.
    pub fn from_value(value: &Value) -> Self {
        let inner = match value.get("staff") {
            Some(staff) if staff.is_object() => staff,
            _ => value,
        };
        let Some(obj) = inner.as_object() else {
            return Self::default();
        };
        Self {
            full_name: text(obj, FULL_NAME_KEYS),
            first_name: text(obj, FIRST_NAME_KEYS),
            last_name: text(obj, LAST_NAME_KEYS),
            username: text(obj, USERNAME_KEYS),
            email: text(obj, EMAIL_KEYS),
            contact_number: text(obj, CONTACT_KEYS),
        }
    }
}

/// Ordered name candidates: full name, "first last", first name, username.
fn name_candidates(
    full_name: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    username: Option<&str>,
) -> Option<String> {
    if let Some(full) = displayable(full_name) {
        return Some(full.trim().to_owned());
    }
    let first = displayable(first_name).map(str::trim);
    let last = displayable(last_name).map(str::trim);
    if let (Some(first), Some(last)) = (first, last) {
        return Some(format!("{first} {last}"));
    }
    first
        .or_else(|| displayable(username).map(str::trim))
        .map(str::to_owned)
}

/// Ordered contact candidates: contact number, then email.
fn contact_candidates(contact_number: Option<&str>, email: Option<&str>) -> Option<String> {
    displayable(contact_number)
        .or_else(|| displayable(email))
        .map(|v| v.trim().to_owned())
}

/// Best displayable name for a user, or `fallback`.
pub fn safe_user_name(user: &UserDisplayInfo, fallback: &str) -> String {
    name_candidates(
        user.full_name.as_deref(),
        user.first_name.as_deref(),
        user.last_name.as_deref(),
        user.username.as_deref(),
    )
    .unwrap_or_else(|| fallback.to_owned())
}

/// Best displayable contact detail for a user, or `fallback`.
pub fn safe_contact_info(user: &UserDisplayInfo, fallback: &str) -> String {
    contact_candidates(user.contact_number.as_deref(), user.email.as_deref())
        .unwrap_or_else(|| fallback.to_owned())
}

/// Best displayable name for a staff member, or `fallback`.
pub fn safe_staff_name(staff: &StaffDisplayInfo, fallback: &str) -> String {
    name_candidates(
        staff.full_name.as_deref(),
        staff.first_name.as_deref(),
        staff.last_name.as_deref(),
        staff.username.as_deref(),
    )
    .unwrap_or_else(|| fallback.to_owned())
}

/// Best displayable contact detail for a staff member, or `fallback`.
pub fn safe_staff_contact(staff: &StaffDisplayInfo, fallback: &str) -> String {
    contact_candidates(staff.contact_number.as_deref(), staff.email.as_deref())
        .unwrap_or_else(|| fallback.to_owned())
}

/// Up to two uppercase initials for an avatar.
///
/// A name that cannot be shown falls back to the initials of `fallback`;
/// if that is blank too, `"?"` is returned.
pub fn user_initials(name: Option<&str>, fallback: &str) -> String {
    displayable(name)
        .and_then(initials_of)
        .or_else(|| initials_of(fallback))
        .unwrap_or_else(|| "?".to_owned())
}

fn initials_of(name: &str) -> Option<String> {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        None
    } else {
        Some(initials)
    }
}
