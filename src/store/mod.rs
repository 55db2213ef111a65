//! Storage gateway for cities, readings, forecasts and advisories.
//!
//! The rest of the crate only sees the [`AirQualityStore`] trait. Which
//! implementation backs it is decided once at startup by [`from_config`]:
//! - [`PgStore`] – PostgreSQL through a lazily connected sqlx pool
//! - [`MemoryStore`] – process-local maps, used for development and tests
//! - [`UnconfiguredStore`] – no store at all; every call reports `NotConfigured`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{City, Forecast, HealthAdvisory, Reading};
use crate::{config::StoreKind, Config};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

/// Errors reported by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No backing store is configured.
    #[error("store is not configured")]
    NotConfigured,

    /// The store is reachable but a required table does not exist.
    #[error("table missing: {0}")]
    MissingTable(String),

    /// The call did not finish within the configured bound.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write was refused by a non-SQL store.
    #[error("write rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the service layer needs from a backing store.
///
/// Implementations must be `Send + Sync`; they are shared across requests
/// behind an `Arc`.
#[async_trait]
pub trait AirQualityStore: Send + Sync {
    // ---
    /// Whether a real store is configured.
    fn is_available(&self) -> bool;

    async fn list_cities(&self) -> StoreResult<Vec<City>>;

    async fn find_city(&self, id: i32) -> StoreResult<Option<City>>;

    /// Most recent reading for a city.
    async fn latest_reading(&self, city_id: i32) -> StoreResult<Option<Reading>>;

    /// Readings recorded at or after `since`, oldest first.
    async fn readings_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>>;

    /// Advisory whose range contains `aqi` (`aqi_min <= aqi <= aqi_max`).
    async fn advisory_for(&self, aqi: i32) -> StoreResult<Option<HealthAdvisory>>;

    /// Up to `limit` stored forecasts dated `from` or later, earliest first.
    async fn forecasts_from(
        &self,
        city_id: i32,
        from: NaiveDate,
        limit: u32,
    ) -> StoreResult<Vec<Forecast>>;

    /// Insert or replace the forecast for `(city_id, forecast_date)`.
    async fn upsert_forecast(&self, forecast: &Forecast) -> StoreResult<Forecast>;

    /// Insert a reading, returning it with its assigned id.
    async fn insert_reading(&self, reading: &Reading) -> StoreResult<Reading>;
}

/// Store used when nothing is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStore;

#[async_trait]
impl AirQualityStore for UnconfiguredStore {
    // ---
    fn is_available(&self) -> bool {
        false
    }

    async fn list_cities(&self) -> StoreResult<Vec<City>> {
        Err(StoreError::NotConfigured)
    }

    async fn find_city(&self, _id: i32) -> StoreResult<Option<City>> {
        Err(StoreError::NotConfigured)
    }

    async fn latest_reading(&self, _city_id: i32) -> StoreResult<Option<Reading>> {
        Err(StoreError::NotConfigured)
    }

    async fn readings_since(
        &self,
        _city_id: i32,
        _since: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        Err(StoreError::NotConfigured)
    }

    async fn advisory_for(&self, _aqi: i32) -> StoreResult<Option<HealthAdvisory>> {
        Err(StoreError::NotConfigured)
    }

    async fn forecasts_from(
        &self,
        _city_id: i32,
        _from: NaiveDate,
        _limit: u32,
    ) -> StoreResult<Vec<Forecast>> {
        Err(StoreError::NotConfigured)
    }

    async fn upsert_forecast(&self, _forecast: &Forecast) -> StoreResult<Forecast> {
        Err(StoreError::NotConfigured)
    }

    async fn insert_reading(&self, _reading: &Reading) -> StoreResult<Reading> {
        Err(StoreError::NotConfigured)
    }
}

/// Build the store selected by the configuration.
///
/// For PostgreSQL the pool connects lazily and the schema bootstrap is
/// attempted here; a database that is down at startup is logged and the
/// service keeps running on estimated data until it comes back.
pub async fn from_config(cfg: &Config) -> Arc<dyn AirQualityStore> {
    // ---
    match (&cfg.store_kind, cfg.db_url.as_deref()) {
        (StoreKind::Postgres, Some(db_url)) => match PgStore::connect_lazy(db_url, cfg) {
            Ok(store) => {
                if let Err(e) = store.bootstrap().await {
                    tracing::warn!("Database bootstrap failed, serving estimated data until it recovers: {e:#}");
                }
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!("Invalid DATABASE_URL, running without a store: {e}");
                Arc::new(UnconfiguredStore)
            }
        },
        (StoreKind::Postgres, None) => {
            tracing::warn!("AQI_STORE=postgres but DATABASE_URL is not set, running without a store");
            Arc::new(UnconfiguredStore)
        }
        (StoreKind::Memory, _) => {
            tracing::info!("Using in-memory store seeded with reference data");
            Arc::new(MemoryStore::seeded())
        }
        (StoreKind::None, _) => {
            tracing::info!("No store configured, serving estimated data");
            Arc::new(UnconfiguredStore)
        }
    }
}
