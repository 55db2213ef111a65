//! Configuration loader for the `aqi-dashboard` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). The resulting [`Config`] is passed explicitly to
//! the store factory and the service layer; nothing reads the environment
//! after startup.
//!
use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional environment variable into `Option<T>`.
macro_rules! parse_env_opt {
    ($var_name:expr, $ty:ty) => {
        env::var($var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
    };
}

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// PostgreSQL at `DATABASE_URL`.
    Postgres,
    /// Process-local store seeded with reference data.
    Memory,
    /// No store; all data is estimated.
    None,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "local" => Ok(Self::Memory),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown store kind: {other}")),
        }
    }
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string, if any.
    pub db_url: Option<String>,

    /// Selected storage backend.
    pub store_kind: StoreKind,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Upper bound on any single store call before it counts as unavailable.
    pub store_timeout: Duration,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Fixed seed for the mock-data random source. Unset in production.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: None,
            store_kind: StoreKind::None,
            db_pool_max: 5,
            store_timeout: Duration::from_millis(2000),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            rng_seed: None,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATABASE_URL` – PostgreSQL connection string (unset: no store)
/// - `AQI_STORE` – `postgres` | `memory` | `none` (default: postgres when
///   `DATABASE_URL` is set, otherwise none)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `STORE_TIMEOUT_MS` – per-call store timeout (default: 2000)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `AQI_RNG_SEED` – fixed seed for estimated data
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let db_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
    let store_kind = match parse_env_opt!("AQI_STORE", String) {
        Some(kind) => kind.parse::<StoreKind>().map_err(|e| anyhow!("Invalid AQI_STORE: {e}"))?,
        None if db_url.is_some() => StoreKind::Postgres,
        None => StoreKind::None,
    };
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", defaults.db_pool_max);
    let store_timeout_ms = parse_env_u32!("STORE_TIMEOUT_MS", 2000);
    let bind_addr = parse_env_opt!("BIND_ADDR", SocketAddr).unwrap_or(defaults.bind_addr);
    let rng_seed = parse_env_opt!("AQI_RNG_SEED", u64);

    Ok(Config {
        db_url,
        store_kind,
        db_pool_max,
        store_timeout: Duration::from_millis(u64::from(store_timeout_ms)),
        bind_addr,
        rng_seed,
    })
}

/// Mask the password portion of a connection URL.
fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // No password: the only colon is the scheme separator
            if !db_url[colon_pos..].starts_with("://") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_db_url = self
            .db_url
            .as_deref()
            .map(mask_db_url)
            .unwrap_or_else(|| "<unset>".to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL     : {}", masked_db_url);
        tracing::info!("  AQI_STORE        : {:?}", self.store_kind);
        tracing::info!("  DB_POOL_MAX      : {}", self.db_pool_max);
        tracing::info!("  STORE_TIMEOUT_MS : {}", self.store_timeout.as_millis());
        tracing::info!("  BIND_ADDR        : {}", self.bind_addr);
        tracing::info!(
            "  AQI_RNG_SEED     : {}",
            self.rng_seed
                .map_or_else(|| "<random>".to_string(), |s| s.to_string())
        );
    }
}
