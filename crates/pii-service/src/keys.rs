//! Wires the configured key sources into a [`KeyProvider`].
//!
//! Resolution order is fixed: the `ENCRYPTION_KEY` secret first, then the
//! database key record. The first source that yields a secret wins for the
//! lifetime of the process.

use anyhow::{Context, Result};
use pii_guard::key::{ConfiguredKeySource, DatabaseKeySource, KeyProvider, KeySource};

use crate::config::Config;

/// Build the ordered key sources for `cfg`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is set but cannot be parsed.
pub fn sources(cfg: &Config) -> Result<Vec<Box<dyn KeySource>>> {
    let mut sources: Vec<Box<dyn KeySource>> = vec![Box::new(ConfiguredKeySource::new(
        cfg.encryption_key.clone(),
    ))];

    if let Some(url) = &cfg.database_url {
        let db = DatabaseKeySource::connect_lazy(url, cfg.key_record_name.clone())
            .context("failed to configure database key source")?;
        sources.push(Box::new(db));
    }

    Ok(sources)
}

/// Build the process [`KeyProvider`] for `cfg`.
///
/// # Errors
///
/// See [`sources`].
pub fn provider(cfg: &Config) -> Result<KeyProvider> {
    Ok(KeyProvider::new(sources(cfg)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pii_guard::GuardMode;

    fn cfg(encryption_key: Option<&str>, database_url: Option<&str>) -> Config {
        Config {
            encryption_key: encryption_key.map(str::to_owned),
            database_url: database_url.map(str::to_owned),
            key_record_name: "pii_field_key".into(),
            guard_mode: GuardMode::Structural,
            field_sets_path: None,
            field_sets_refresh_interval_secs: 300,
            listen_port: 8080,
            otel_exporter_otlp_endpoint: None,
            log_level: "info".into(),
        }
    }

    #[test]
    fn configured_secret_only() {
        let names: Vec<_> = sources(&cfg(Some("secret"), None))
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["configuration"]);
    }

    #[tokio::test]
    async fn configuration_precedes_database() {
        let names: Vec<_> = sources(&cfg(Some("secret"), Some("mysql://app:pw@127.0.0.1/stalls")))
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["configuration", "database"]);
    }

    #[tokio::test]
    async fn configured_secret_resolves_without_database_round_trip() {
        let provider =
            provider(&cfg(Some("secret"), Some("mysql://app:pw@127.0.0.1:1/stalls"))).unwrap();
        assert!(provider.key().await.is_ok());
    }

    #[tokio::test]
    async fn invalid_database_url_is_rejected() {
        assert!(sources(&cfg(None, Some("not a url"))).is_err());
    }
}
