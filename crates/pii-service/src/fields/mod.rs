//! Entity field sets: which columns of which rows hold protected values.
//!
//! # Responsibilities
//!
//! - Provide built-in field sets for the stall-rental entities.
//! - Optionally load a YAML file of field sets at startup and reload it on a
//!   refresh interval.
//!
//! # Module invariants
//!
//! - **No crypto.** This module only names columns; it never touches values.

pub mod registry;

pub use registry::{FieldSetRegistry, RegistryError};

use std::path::Path;

use anyhow::{Context, Result};
use tokio::time;
use tracing::{info, warn};

/// Read the YAML field-set file at `path` and atomically replace the registry.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed; the registry is
/// left unchanged.
pub async fn load_file(path: &Path, registry: &FieldSetRegistry) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read field-set file {}", path.display()))?;

    let sets = registry::parse_field_sets(&text)
        .with_context(|| format!("failed to parse field-set file {}", path.display()))?;

    if sets.is_empty() {
        warn!(path = %path.display(), "field-set file defines no entities");
    }

    registry.replace_all(sets);
    info!(count = registry.len(), "field sets loaded");
    Ok(())
}

/// Spawn a background task that periodically reloads the field-set file.
///
/// On reload failure the previous field sets are retained and a warning is
/// emitted.
pub fn refresh_task(
    path: String,
    interval_secs: u64,
    registry: FieldSetRegistry,
) -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(interval_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; startup already loaded the file.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = load_file(Path::new(&path), &registry).await {
                warn!(error = %e, "field-set reload failed; retaining previous sets");
            }
        }
    })
}
