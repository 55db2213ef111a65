//! Application entry point for the `aqi-dashboard` backend service.
//!
//! This binary orchestrates the full startup sequence for the air quality
//! dashboard API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Selecting the storage backend (PostgreSQL, in-memory, or none)
//! - Building the [`AirQualityService`] that applies the fallback policy
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (optional) – PostgreSQL connection string; unset means
//!   every response is estimated
//! - `AQI_STORE` (optional) – `postgres` | `memory` | `none`
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `STORE_TIMEOUT_MS` (optional) – per-call store timeout (default: 2000)
//! - `BIND_ADDR` (optional) – listen address (default: `0.0.0.0:8080`)
//! - `AQI_RNG_SEED` (optional) – fixed seed for estimated data
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating storage to `store`, domain rules to `service`, configuration
//! parsing to `config`, and route registration to `routes`.
use std::{env, io::IsTerminal, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod advisory;
mod baseline;
mod category;
mod cities;
mod config;
mod forecast;
mod models;
mod routes;
mod schema;
mod service;
mod store;
mod synth;

pub use config::Config;

// Re-exported so routes/*.rs depend on their parent module (main.rs) rather
// than reaching into service.rs directly
pub use service::{AirQualityService, ServiceError, Sourced};

use baseline::BaselineTable;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let store = store::from_config(&cfg).await;
    if store.is_available() {
        tracing::info!("Store ready: {:?}", cfg.store_kind);
    } else {
        tracing::warn!("No store configured, serving estimated data only");
    }

    let service = Arc::new(AirQualityService::new(
        store,
        Arc::new(BaselineTable::builtin()),
        &cfg,
    ));

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(service);

    tracing::info!("Listening on {}", cfg.bind_addr);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off  
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AXUM_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AXUM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
