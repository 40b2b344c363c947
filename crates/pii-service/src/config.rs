//! Configuration loading and validation for the protection service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if the configuration is incomplete.

use anyhow::{Context, Result};
use pii_guard::GuardMode;
use serde::Deserialize;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Field key secret (hex, base64, or passphrase). Consulted first.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// MySQL URL of the application database holding the key record.
    #[serde(default)]
    pub database_url: Option<String>,

    /// `key_name` of the row in `encryption_keys` to use.
    #[serde(default = "default_key_record_name")]
    pub key_record_name: String,

    /// How the write path recognises values that are already encrypted.
    #[serde(default)]
    pub guard_mode: GuardMode,

    /// Optional YAML file of entity field sets, replacing the built-in ones.
    #[serde(default)]
    pub field_sets_path: Option<String>,

    /// How often (seconds) to reload the field-set file.
    #[serde(default = "default_field_sets_refresh_interval")]
    pub field_sets_refresh_interval_secs: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for span export. Spans are not exported when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_record_name() -> String {
    "pii_field_key".into()
}
fn default_field_sets_refresh_interval() -> u64 {
    300
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key and the database URL (which embeds a password) stay out of logs.
        f.debug_struct("Config")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("key_record_name", &self.key_record_name)
            .field("guard_mode", &self.guard_mode)
            .field("field_sets_path", &self.field_sets_path)
            .field(
                "field_sets_refresh_interval_secs",
                &self.field_sets_refresh_interval_secs,
            )
            .field("listen_port", &self.listen_port)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or no key source is set.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let mut c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.normalise();
        c.validate()?;
        Ok(c)
    }

    /// Treat blank optional values as unset.
    fn normalise(&mut self) {
        for value in [
            &mut self.encryption_key,
            &mut self.database_url,
            &mut self.field_sets_path,
            &mut self.otel_exporter_otlp_endpoint,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.encryption_key.is_none() && self.database_url.is_none() {
            anyhow::bail!("one of ENCRYPTION_KEY or DATABASE_URL must be set");
        }
        if self.database_url.is_some() {
            ensure_non_empty(&self.key_record_name, "KEY_RECORD_NAME")?;
        }
        if self.field_sets_refresh_interval_secs == 0 {
            anyhow::bail!("FIELD_SETS_REFRESH_INTERVAL_SECS must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
