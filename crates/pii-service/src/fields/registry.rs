//! In-memory registry of protected columns, keyed by entity name.
//!
//! Loaded at startup and refreshed on a configurable interval.
//! The registry uses `arc-swap` for lock-free reads on the hot path.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use pii_guard::FieldSet;
use thiserror::Error;

/// Field sets compiled into the binary, used when no file is configured.
const BUILTIN_FIELD_SETS: &str = include_str!("field_sets.yaml");

/// Errors from the field-set registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested entity has no registered field set.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The field-set document is not a mapping of entity → column list.
    #[error("invalid field-set document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Parse a YAML document of `entity: [column, ...]` entries.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] if the document has another shape.
pub fn parse_field_sets(text: &str) -> Result<HashMap<String, FieldSet>, RegistryError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Shared, lock-free map of entity name → [`FieldSet`].
///
/// Internally backed by [`ArcSwap`] so readers never block and the background
/// refresh task can atomically swap in a completely new map.
#[derive(Clone, Debug)]
pub struct FieldSetRegistry {
    inner: Arc<ArcSwap<HashMap<String, FieldSet>>>,
}

impl FieldSetRegistry {
    /// Create a new, empty [`FieldSetRegistry`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Create a registry holding the built-in field sets.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] if the embedded document is invalid.
    pub fn builtin() -> Result<Self, RegistryError> {
        let registry = Self::new();
        registry.replace_all(parse_field_sets(BUILTIN_FIELD_SETS)?);
        Ok(registry)
    }

    /// Return the number of registered entities.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if no entities are registered.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Look up the field set for an entity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEntity`] if `entity` is not registered.
    pub fn get(&self, entity: &str) -> Result<FieldSet, RegistryError> {
        self.inner
            .load()
            .get(entity)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownEntity(entity.to_owned()))
    }

    /// Atomically replace the entire map.
    pub fn replace_all(&self, sets: HashMap<String, FieldSet>) {
        self.inner.store(Arc::new(sets));
    }
}

impl Default for FieldSetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initially_empty() {
        let registry = FieldSetRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn builtin_sets_load() {
        let registry = FieldSetRegistry::builtin().unwrap();
        let applicant = registry.get("applicant").unwrap();
        assert!(applicant.contains("applicant_full_name"));
        assert!(applicant.contains("applicant_contact_number"));
        assert!(registry.get("staff").is_ok());
    }

    #[test]
    fn unknown_entity_returns_error() {
        let registry = FieldSetRegistry::builtin().unwrap();
        assert!(matches!(
            registry.get("vendor"),
            Err(RegistryError::UnknownEntity(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(parse_field_sets("- just\n- a list\n").is_err());
        assert!(parse_field_sets("applicant: 3\n").is_err());
    }

    #[test]
    fn replace_all_is_atomic() {
        let registry = FieldSetRegistry::new();
        registry.replace_all(parse_field_sets("applicant: [applicant_full_name]").unwrap());
        registry.replace_all(parse_field_sets("staff: [first_name, last_name]").unwrap());

        // Only staff should be present after the second replace.
        assert!(registry.get("applicant").is_err());
        assert_eq!(registry.get("staff").unwrap().len(), 2);
    }
}
