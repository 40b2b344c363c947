//! Presentation-boundary safety net.
//!
//! Nothing here needs the key or can fail. Every name, contact number, email
//! or address headed for a screen goes through these helpers, whether or not
//! the backend already decrypted it.

pub mod heuristic;
pub mod identity;

pub use heuristic::{looks_encrypted, safe_display_value, LONG_BASE64_THRESHOLD};
pub use identity::{
    safe_contact_info, safe_staff_contact, safe_staff_name, safe_user_name, user_initials,
    StaffDisplayInfo, UserDisplayInfo,
};
