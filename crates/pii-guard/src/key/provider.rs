//! [`KeyProvider`]: resolve-once cache for the field encryption key.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{KeyError, KeyHandle, KeyMaterial, KeySource};

/// Resolves the field key from an ordered list of [`KeySource`]s and memoizes it.
///
/// Construct one per process and pass clones to every caller. Concurrent
/// first calls wait on the same resolution. A failed resolution is not cached,
/// so the next call tries the sources again.
#[derive(Clone)]
pub struct KeyProvider {
    inner: Arc<Inner>,
}

struct Inner {
    sources: Vec<Box<dyn KeySource>>,
    resolved: OnceCell<KeyHandle>,
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.inner.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("KeyProvider")
            .field("sources", &names)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl KeyProvider {
    /// Create a provider that consults `sources` in the given order.
    pub fn new(sources: Vec<Box<dyn KeySource>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                sources,
                resolved: OnceCell::new(),
            }),
        }
    }

    /// Create a provider around key material that is already known.
    pub fn from_material(key: KeyMaterial) -> Self {
        Self {
            inner: Arc::new(Inner {
                sources: Vec::new(),
                resolved: OnceCell::new_with(Some(Arc::new(key))),
            }),
        }
    }

    /// Returns `true` once a key has been resolved.
    pub fn is_ready(&self) -> bool {
        self.inner.resolved.initialized()
    }

    /// Return the process key, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Unavailable`] if no source yields a secret, or the
    /// first configured source's [`KeyError::Source`] error if it cannot be read.
    pub async fn key(&self) -> Result<KeyHandle, KeyError> {
        self.inner
            .resolved
            .get_or_try_init(|| self.resolve())
            .await
            .cloned()
    }

    async fn resolve(&self) -> Result<KeyHandle, KeyError> {
        for source in &self.inner.sources {
            let secret = match source.fetch().await {
                Ok(secret) => secret,
                Err(e) => {
                    warn!(source = source.name(), error = %e, "key source failed");
                    return Err(e);
                }
            };

            match secret.as_deref().and_then(KeyMaterial::from_secret) {
                Some(key) => {
                    info!(source = source.name(), "field encryption key resolved");
                    return Ok(Arc::new(key));
                }
                None => debug!(source = source.name(), "key source not configured"),
            }
        }

        Err(KeyError::Unavailable(
            "no configured secret and no database key record".into(),
        ))
    }
}
