//! Shared application state injected into every Axum handler.

use pii_guard::{GuardMode, KeyProvider, PiiProtector};

use crate::fields::FieldSetRegistry;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-backed) so that Axum can clone the
/// state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Field cipher entry point bound to the process key.
    pub protector: PiiProtector,
    /// Lock-free registry of protected columns per entity.
    pub field_sets: FieldSetRegistry,
}

impl AppState {
    /// Create a new [`AppState`] with the provided protector and registry.
    pub fn new(protector: PiiProtector, field_sets: FieldSetRegistry) -> Self {
        Self {
            protector,
            field_sets,
        }
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] with no key source and no field sets, suitable for tests.
    fn default() -> Self {
        Self::new(
            PiiProtector::new(KeyProvider::new(Vec::new()), GuardMode::default()),
            FieldSetRegistry::new(),
        )
    }
}
