//! `pii-service` — HTTP host for the PII field protection layer.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise tracing (JSON logs, optional OTLP export).
//! 3. Build the key provider and resolve the field key. No key, no service.
//! 4. Load entity field sets (built-in, or from `FIELD_SETS_PATH`).
//! 5. Spawn the field-set refresh task when a file is configured.
//! 6. Build the Axum router and start serving.

mod config;
mod fields;
mod keys;
mod server;
mod telemetry;

use std::path::Path;

use anyhow::{Context, Result};
use pii_guard::PiiProtector;
use tracing::info;

use config::Config;
use fields::FieldSetRegistry;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        guard_mode = ?cfg.guard_mode,
        "pii-service starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field key
    // -----------------------------------------------------------------------
    let protector = PiiProtector::new(keys::provider(&cfg)?, cfg.guard_mode);
    protector
        .warm_up()
        .await
        .context("field encryption key could not be resolved")?;

    // -----------------------------------------------------------------------
    // 4. Field sets
    // -----------------------------------------------------------------------
    let field_sets = FieldSetRegistry::builtin()?;
    if let Some(path) = &cfg.field_sets_path {
        fields::load_file(Path::new(path), &field_sets).await?;
    }
    info!(count = field_sets.len(), "field sets ready");

    // -----------------------------------------------------------------------
    // 5. Background tasks
    // -----------------------------------------------------------------------
    let _field_set_refresh = cfg.field_sets_path.clone().map(|path| {
        fields::refresh_task(
            path,
            cfg.field_sets_refresh_interval_secs,
            field_sets.clone(),
        )
    });

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(protector, field_sets);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
