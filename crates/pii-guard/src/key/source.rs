//! Places a field-key secret can come from.

use async_trait::async_trait;

use super::KeyError;

/// A single place the field-key secret may be read from.
///
/// `fetch` returns `Ok(None)` when the source is simply not configured, so
/// the provider can move on to the next source. An `Err` means the source is
/// configured but could not be read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Short label used in logs. Never the secret itself.
    fn name(&self) -> &'static str;

    /// Read the secret string.
    async fn fetch(&self) -> Result<Option<String>, KeyError>;
}

/// A secret already held in process configuration.
pub struct ConfiguredKeySource {
    secret: Option<String>,
}

impl ConfiguredKeySource {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

impl std::fmt::Debug for ConfiguredKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredKeySource")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

#[async_trait]
impl KeySource for ConfiguredKeySource {
    fn name(&self) -> &'static str {
        "configuration"
    }

    async fn fetch(&self) -> Result<Option<String>, KeyError> {
        Ok(self.secret.clone())
    }
}

/// Reads the newest active key record from the application database.
///
/// Expects a table shaped like:
///
/// ```sql
/// CREATE TABLE encryption_keys (
///     key_name   VARCHAR(64)  NOT NULL,
///     key_value  TEXT         NOT NULL,
///     is_active  TINYINT(1)   NOT NULL DEFAULT 1,
///     created_at TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
#[cfg(feature = "database")]
#[derive(Debug, Clone)]
pub struct DatabaseKeySource {
    pool: sqlx::MySqlPool,
    key_name: String,
}

#[cfg(feature = "database")]
impl DatabaseKeySource {
    const QUERY: &'static str = "SELECT key_value FROM encryption_keys \
         WHERE key_name = ? AND is_active = 1 \
         ORDER BY created_at DESC LIMIT 1";

    pub fn new(pool: sqlx::MySqlPool, key_name: impl Into<String>) -> Self {
        Self {
            pool,
            key_name: key_name.into(),
        }
    }

    /// Connect lazily; the first query opens the connection.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Source`] if `database_url` cannot be parsed.
    pub fn connect_lazy(database_url: &str, key_name: impl Into<String>) -> Result<Self, KeyError> {
        let pool = sqlx::MySqlPool::connect_lazy(database_url).map_err(|e| KeyError::Source {
            source_name: "database",
            reason: format!("invalid database url: {e}"),
        })?;
        Ok(Self::new(pool, key_name))
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl KeySource for DatabaseKeySource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn fetch(&self) -> Result<Option<String>, KeyError> {
        sqlx::query_scalar::<_, String>(Self::QUERY)
            .bind(&self.key_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| KeyError::Source {
                source_name: self.name(),
                reason: e.to_string(),
            })
    }
}
