//! Air quality service: store access with transparent fallback.
//!
//! Every store call runs under a bounded timeout. When the store is not
//! configured, is missing a table, returns no rows, times out or fails, the
//! service answers from the baseline estimator, the reading synthesizer or
//! the forecast generator instead and tags the result as
//! [`Sourced::Fallback`]. Store problems never reach the caller as errors.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::advisory::{advisory_view, AdvisoryView};
use crate::baseline::BaselineTable;
use crate::category::AqiCategory;
use crate::cities::{builtin_cities, CityFilter};
use crate::forecast;
use crate::models::{City, Forecast, Reading};
use crate::store::{AirQualityStore, StoreError, StoreResult};
use crate::synth::{simulate_live, synthesize, synthesize_day};
use crate::Config;

// ---

/// Largest day window accepted for history and forecasts.
pub const MAX_DAYS: i64 = 365;

/// Days of history the trend forecast looks back over.
const FORECAST_HISTORY_DAYS: i64 = 7;

/// Why estimated data was served instead of stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NotConfigured,
    MissingTable,
    Empty,
    Timeout,
    StoreError,
}

impl FallbackReason {
    // ---
    pub fn from_error(err: &StoreError) -> Self {
        match err {
            StoreError::NotConfigured => FallbackReason::NotConfigured,
            StoreError::MissingTable(_) => FallbackReason::MissingTable,
            StoreError::Timeout(_) => FallbackReason::Timeout,
            StoreError::Database(_) | StoreError::Rejected(_) => FallbackReason::StoreError,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FallbackReason::NotConfigured => "database not configured",
            FallbackReason::MissingTable => "database tables missing",
            FallbackReason::Empty => "no stored data",
            FallbackReason::Timeout => "database timed out",
            FallbackReason::StoreError => "database error",
        }
    }
}

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    /// Read from (or written to) the backing store.
    Store(T),
    /// Estimated locally.
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Sourced<T> {
    // ---
    pub fn value(&self) -> &T {
        match self {
            Sourced::Store(value) | Sourced::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Sourced::Store(value) | Sourced::Fallback { value, .. } => value,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Sourced::Store(_) => None,
            Sourced::Fallback { reason, .. } => Some(*reason),
        }
    }

    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Sourced::Store(value) => Sourced::Store(f(value)),
            Sourced::Fallback { value, reason } => Sourced::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

/// Errors the caller must handle; store failures are never among them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("days must be between 1 and {max}, got {0}", max = MAX_DAYS)]
    InvalidDays(i64),

    #[error("AQI must be non-negative, got {0}")]
    InvalidAqi(i32),

    #[error("city {0} not found")]
    CityNotFound(i32),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Check a day window and convert it to a count.
pub fn validate_days(days: i64) -> ServiceResult<u32> {
    // ---
    if (1..=MAX_DAYS).contains(&days) {
        Ok(days as u32)
    } else {
        Err(ServiceError::InvalidDays(days))
    }
}

pub struct AirQualityService {
    store: Arc<dyn AirQualityStore>,
    baselines: Arc<BaselineTable>,
    store_timeout: Duration,
    rng_seed: Option<u64>,
}

impl AirQualityService {
    // ---
    pub fn new(store: Arc<dyn AirQualityStore>, baselines: Arc<BaselineTable>, cfg: &Config) -> Self {
        // ---
        Self {
            store,
            baselines,
            store_timeout: cfg.store_timeout,
            rng_seed: cfg.rng_seed,
        }
    }

    pub fn store_available(&self) -> bool {
        self.store.is_available()
    }

    /// Fresh random source for one operation.
    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Run a store call under the configured timeout.
    async fn call<T>(&self, fut: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        // ---
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.store_timeout)),
        }
    }

    /// Log a store failure and turn it into a fallback reason.
    fn degraded(&self, operation: &str, err: &StoreError) -> FallbackReason {
        // ---
        let reason = FallbackReason::from_error(err);
        match reason {
            FallbackReason::NotConfigured => {
                debug!("{operation}: {err}, using estimated data")
            }
            _ => warn!("{operation}: {err}, using estimated data"),
        }
        reason
    }

    /// Latest reading for a city.
    pub async fn current(&self, city_id: i32) -> Sourced<Reading> {
        // ---
        let reason = match self.call(self.store.latest_reading(city_id)).await {
            Ok(Some(reading)) => return Sourced::Store(reading),
            Ok(None) => {
                info!("current: no readings stored for city {city_id}, using estimated data");
                FallbackReason::Empty
            }
            Err(e) => self.degraded("current", &e),
        };

        let today = Utc::now().date_naive();
        let value = synthesize_day(&self.baselines, city_id, today, &mut self.rng());
        Sourced::Fallback { value, reason }
    }

    /// Simulate a fresh reading for a known city and store it.
    pub async fn refresh_current(&self, city_id: i32) -> ServiceResult<Sourced<Reading>> {
        // ---
        let city = self.city(city_id).await?.into_value();
        let reading = simulate_live(&self.baselines, &city, Utc::now(), &mut self.rng());

        match self.call(self.store.insert_reading(&reading)).await {
            Ok(stored) => {
                info!(
                    "Stored simulated reading for {} (AQI {})",
                    city.name, stored.aqi_value
                );
                Ok(Sourced::Store(stored))
            }
            Err(e) => {
                let reason = self.degraded("refresh_current", &e);
                Ok(Sourced::Fallback {
                    value: reading,
                    reason,
                })
            }
        }
    }

    /// Daily readings for the last `days` days, oldest first.
    pub async fn historical(&self, city_id: i32, days: i64) -> ServiceResult<Sourced<Vec<Reading>>> {
        // ---
        let days = validate_days(days)?;
        let since = Utc::now() - ChronoDuration::days(i64::from(days));

        let reason = match self.call(self.store.readings_since(city_id, since)).await {
            Ok(readings) if !readings.is_empty() => return Ok(Sourced::Store(readings)),
            Ok(_) => {
                info!("historical: no readings for city {city_id} in {days} days, using estimated data");
                FallbackReason::Empty
            }
            Err(e) => self.degraded("historical", &e),
        };

        let today = Utc::now().date_naive();
        let value = synthesize(&self.baselines, city_id, days, today, &mut self.rng());
        Ok(Sourced::Fallback { value, reason })
    }

    /// Forecast for the next `days` days, nearest first.
    ///
    /// Without `force_refresh`, stored forecasts are returned when the store
    /// already holds the whole horizon. Otherwise a new forecast is generated
    /// from the last week of stored readings and upserted day by day; days
    /// whose write fails are left out of the result.
    pub async fn forecast(
        &self,
        city_id: i32,
        days: i64,
        force_refresh: bool,
    ) -> ServiceResult<Sourced<Vec<Forecast>>> {
        // ---
        let days = validate_days(days)?;
        let now = Utc::now();
        let today = now.date_naive();
        let mut rng = self.rng();

        let mock = |rng: &mut StdRng, reason| Sourced::Fallback {
            value: forecast::mock_forecast(&self.baselines, city_id, days, today, now, rng),
            reason,
        };

        if !force_refresh {
            let tomorrow = today + ChronoDuration::days(1);
            match self.call(self.store.forecasts_from(city_id, tomorrow, days)).await {
                Ok(cached) if cached.len() == days as usize => {
                    debug!("forecast: serving {days} stored days for city {city_id}");
                    return Ok(Sourced::Store(cached));
                }
                Ok(_) => {}
                Err(e) => return Ok(mock(&mut rng, self.degraded("forecast", &e))),
            }
        }

        let since = now - ChronoDuration::days(FORECAST_HISTORY_DAYS);
        let recent = match self.call(self.store.readings_since(city_id, since)).await {
            Ok(recent) => recent,
            Err(e) => return Ok(mock(&mut rng, self.degraded("forecast", &e))),
        };

        let generated = forecast::forecast(
            &self.baselines,
            city_id,
            days,
            &recent,
            today,
            now,
            &mut rng,
        );

        if recent.is_empty() {
            info!("forecast: no recent readings for city {city_id}, using mock forecast");
            return Ok(Sourced::Fallback {
                value: generated,
                reason: FallbackReason::Empty,
            });
        }

        let mut stored = Vec::with_capacity(generated.len());
        let mut last_err = None;
        for f in &generated {
            match self.call(self.store.upsert_forecast(f)).await {
                Ok(saved) => stored.push(saved),
                Err(e) => {
                    warn!(
                        "forecast: failed to store city {} for {}, omitting: {}",
                        city_id, f.forecast_date, e
                    );
                    last_err = Some(e);
                }
            }
        }

        // Nothing persisted: serve the generated series, flagged
        if stored.is_empty() {
            if let Some(e) = last_err {
                let reason = self.degraded("forecast", &e);
                return Ok(Sourced::Fallback {
                    value: generated,
                    reason,
                });
            }
        }

        info!(
            "forecast: generated {} of {} days for city {}",
            stored.len(),
            days,
            city_id
        );
        Ok(Sourced::Store(stored))
    }

    /// Health advisory for an AQI value.
    pub async fn advisory(&self, aqi: i32) -> ServiceResult<Sourced<AdvisoryView>> {
        // ---
        if aqi < 0 {
            return Err(ServiceError::InvalidAqi(aqi));
        }

        let reason = match self.call(self.store.advisory_for(aqi)).await {
            Ok(Some(row)) => {
                let expected = AqiCategory::from_aqi(aqi);
                if AqiCategory::parse(&row.category) != Some(expected) {
                    warn!(
                        "advisory: stored row {}..={} is labelled {:?}, classifier says {}",
                        row.aqi_min, row.aqi_max, row.category, expected
                    );
                }
                return Ok(Sourced::Store(advisory_view(aqi, Some(row))));
            }
            Ok(None) => {
                warn!("advisory: no stored range covers AQI {aqi}, health_advisories has a gap");
                FallbackReason::Empty
            }
            Err(e) => self.degraded("advisory", &e),
        };

        Ok(Sourced::Fallback {
            value: advisory_view(aqi, None),
            reason,
        })
    }

    /// All cities matching `filter`.
    pub async fn cities(&self, filter: &CityFilter) -> Sourced<Vec<City>> {
        // ---
        let listed = match self.call(self.store.list_cities()).await {
            Ok(cities) if !cities.is_empty() => Sourced::Store(cities),
            Ok(_) => {
                info!("cities: store has no cities, using built-in catalogue");
                Sourced::Fallback {
                    value: builtin_cities(),
                    reason: FallbackReason::Empty,
                }
            }
            Err(e) => Sourced::Fallback {
                value: builtin_cities(),
                reason: self.degraded("cities", &e),
            },
        };

        listed.map(|cities| cities.into_iter().filter(|c| filter.matches(c)).collect())
    }

    /// A single city. Unknown ids are an error here, unlike baseline lookup.
    pub async fn city(&self, id: i32) -> ServiceResult<Sourced<City>> {
        // ---
        match self.call(self.store.find_city(id)).await {
            Ok(Some(city)) => Ok(Sourced::Store(city)),
            Ok(None) => {
                debug!("city: {id} not in store, checking built-in catalogue");
                builtin_city(id, FallbackReason::Empty)
            }
            Err(e) => builtin_city(id, self.degraded("city", &e)),
        }
    }
}

fn builtin_city(id: i32, reason: FallbackReason) -> ServiceResult<Sourced<City>> {
    // ---
    builtin_cities()
        .into_iter()
        .find(|c| c.id == id)
        .map(|value| Sourced::Fallback { value, reason })
        .ok_or(ServiceError::CityNotFound(id))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::HealthAdvisory;
    use crate::store::{MemoryStore, UnconfiguredStore};
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use tokio_test::{assert_err, assert_ok};

    fn test_config() -> Config {
        Config {
            rng_seed: Some(17),
            store_timeout: Duration::from_millis(200),
            ..Config::default()
        }
    }

    fn service(store: Arc<dyn AirQualityStore>) -> AirQualityService {
        AirQualityService::new(store, Arc::new(BaselineTable::builtin()), &test_config())
    }

    /// Wraps a `MemoryStore`, optionally failing writes (for one forecast
    /// date or all of them) or stalling every call.
    struct FlakyStore {
        inner: MemoryStore,
        fail_forecast_on: Option<NaiveDate>,
        fail_writes: bool,
        stall: Option<Duration>,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                fail_forecast_on: None,
                fail_writes: false,
                stall: None,
            }
        }

        async fn maybe_stall(&self) {
            if let Some(d) = self.stall {
                tokio::time::sleep(d).await;
            }
        }
    }

    #[async_trait]
    impl AirQualityStore for FlakyStore {
        fn is_available(&self) -> bool {
            true
        }

        async fn list_cities(&self) -> StoreResult<Vec<City>> {
            self.maybe_stall().await;
            self.inner.list_cities().await
        }

        async fn find_city(&self, id: i32) -> StoreResult<Option<City>> {
            self.maybe_stall().await;
            self.inner.find_city(id).await
        }

        async fn latest_reading(&self, city_id: i32) -> StoreResult<Option<Reading>> {
            self.maybe_stall().await;
            self.inner.latest_reading(city_id).await
        }

        async fn readings_since(
            &self,
            city_id: i32,
            since: DateTime<Utc>,
        ) -> StoreResult<Vec<Reading>> {
            self.maybe_stall().await;
            self.inner.readings_since(city_id, since).await
        }

        async fn advisory_for(&self, aqi: i32) -> StoreResult<Option<HealthAdvisory>> {
            self.maybe_stall().await;
            self.inner.advisory_for(aqi).await
        }

        async fn forecasts_from(
            &self,
            city_id: i32,
            from: NaiveDate,
            limit: u32,
        ) -> StoreResult<Vec<Forecast>> {
            self.maybe_stall().await;
            self.inner.forecasts_from(city_id, from, limit).await
        }

        async fn upsert_forecast(&self, forecast: &Forecast) -> StoreResult<Forecast> {
            self.maybe_stall().await;
            if self.fail_writes {
                return Err(StoreError::MissingTable("aqi_forecasts".to_string()));
            }
            if self.fail_forecast_on == Some(forecast.forecast_date) {
                return Err(StoreError::Rejected("simulated write failure".to_string()));
            }
            self.inner.upsert_forecast(forecast).await
        }

        async fn insert_reading(&self, reading: &Reading) -> StoreResult<Reading> {
            self.maybe_stall().await;
            if self.fail_writes {
                return Err(StoreError::Rejected("simulated write failure".to_string()));
            }
            self.inner.insert_reading(reading).await
        }
    }

    async fn store_with_history(city_id: i32, values: &[i32]) -> MemoryStore {
        // ---
        let store = MemoryStore::seeded();
        let now = Utc::now();
        for (i, &aqi) in values.iter().enumerate() {
            let at = now - ChronoDuration::hours(((values.len() - i) * 6) as i64);
            let r = Reading::from_aqi(0, city_id, "Test Station", aqi, at);
            store.insert_reading(&r).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_unconfigured_store_falls_back_everywhere() {
        // ---
        let svc = service(Arc::new(UnconfiguredStore));
        assert!(!svc.store_available());

        let current = svc.current(1).await;
        assert_eq!(current.fallback_reason(), Some(FallbackReason::NotConfigured));
        assert!(current.value().aqi_value >= 10);

        let history = assert_ok!(svc.historical(1, 7).await);
        assert_eq!(history.fallback_reason(), Some(FallbackReason::NotConfigured));
        assert_eq!(history.value().len(), 7);

        let cities = svc.cities(&CityFilter::default()).await;
        assert!(cities.is_fallback());
        assert_eq!(cities.value().len(), builtin_cities().len());

        let advisory = assert_ok!(svc.advisory(250).await);
        assert!(advisory.is_fallback());
        assert_eq!(advisory.value().category.as_str(), "Poor");
    }

    #[tokio::test]
    async fn test_mock_forecast_without_store() {
        // ---
        let svc = service(Arc::new(UnconfiguredStore));
        let result = assert_ok!(svc.forecast(1, 3, false).await);

        assert_eq!(result.fallback_reason(), Some(FallbackReason::NotConfigured));
        let forecasts = result.value();
        assert_eq!(forecasts.len(), 3);
        for f in forecasts {
            assert_eq!(f.model_version, "mock");
            assert_eq!(f.confidence_score, 0.7);
        }
    }

    #[tokio::test]
    async fn test_mock_forecast_when_no_history_is_not_stored() {
        // ---
        let store = Arc::new(MemoryStore::seeded());
        let svc = service(store.clone());

        let result = assert_ok!(svc.forecast(1, 3, true).await);
        assert_eq!(result.fallback_reason(), Some(FallbackReason::Empty));
        assert!(result.value().iter().all(|f| f.model_version == "mock"));
        assert_eq!(store.forecast_count().await, 0);
    }

    #[tokio::test]
    async fn test_trend_forecast_is_stored_and_cached() {
        // ---
        let store = Arc::new(store_with_history(1, &[170, 180, 190]).await);
        let svc = service(store.clone());

        let generated = assert_ok!(svc.forecast(1, 5, true).await);
        assert!(!generated.is_fallback());
        assert_eq!(generated.value().len(), 5);
        assert!(generated.value().iter().all(|f| f.model_version == "v1.0"));
        assert_eq!(store.forecast_count().await, 5);

        let confidences: Vec<f64> = generated
            .value()
            .iter()
            .map(|f| f.confidence_score)
            .collect();
        assert!(confidences.windows(2).all(|w| w[1] <= w[0]));
        assert!(confidences.iter().all(|&c| c >= 0.6));

        // A plain read serves what was stored
        let cached = assert_ok!(svc.forecast(1, 5, false).await);
        assert_eq!(cached, Sourced::Store(generated.into_value()));
    }

    #[tokio::test]
    async fn test_regeneration_replaces_same_keys() {
        // ---
        let store = Arc::new(store_with_history(2, &[100, 140, 180]).await);
        let first = AirQualityService::new(
            store.clone(),
            Arc::new(BaselineTable::builtin()),
            &Config {
                rng_seed: Some(1),
                ..test_config()
            },
        );
        let second = AirQualityService::new(
            store.clone(),
            Arc::new(BaselineTable::builtin()),
            &Config {
                rng_seed: Some(2),
                ..test_config()
            },
        );

        assert_ok!(first.forecast(2, 3, true).await);
        let latest = assert_ok!(second.forecast(2, 3, true).await).into_value();

        assert_eq!(store.forecast_count().await, 3);
        let tomorrow = Utc::now().date_naive() + ChronoDuration::days(1);
        let stored = store.forecasts_from(2, tomorrow, 10).await.unwrap();
        assert_eq!(stored, latest);
    }

    #[tokio::test]
    async fn test_failed_write_omits_only_that_day() {
        // ---
        let inner = store_with_history(1, &[150, 160]).await;
        let fail_on = Utc::now().date_naive() + ChronoDuration::days(2);
        let store = FlakyStore {
            fail_forecast_on: Some(fail_on),
            ..FlakyStore::new(inner)
        };
        let svc = service(Arc::new(store));

        let result = assert_ok!(svc.forecast(1, 4, true).await).into_value();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|f| f.forecast_date != fail_on));
        assert!((result[0].confidence_score - 0.9).abs() < 1e-9);
        assert!((result[1].confidence_score - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_all_writes_failing_serves_generated_forecast() {
        // ---
        let store = Arc::new(FlakyStore {
            fail_writes: true,
            ..FlakyStore::new(store_with_history(1, &[150, 160]).await)
        });
        let svc = service(store.clone());

        let result = assert_ok!(svc.forecast(1, 3, true).await);
        assert_eq!(result.fallback_reason(), Some(FallbackReason::MissingTable));
        let forecasts = result.value();
        assert_eq!(forecasts.len(), 3);
        assert!(forecasts.iter().all(|f| f.model_version == "v1.0"));
        assert_eq!(store.inner.forecast_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_with_failed_insert_is_flagged() {
        // ---
        let store = Arc::new(FlakyStore {
            fail_writes: true,
            ..FlakyStore::new(MemoryStore::seeded())
        });
        let svc = service(store.clone());

        let refreshed = assert_ok!(svc.refresh_current(1).await);
        assert_eq!(refreshed.fallback_reason(), Some(FallbackReason::StoreError));
        assert_eq!(
            refreshed.value().station_name.as_deref(),
            Some("Delhi Central")
        );
        assert!(store.inner.latest_reading(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_city_table_uses_catalogue() {
        // ---
        let svc = service(Arc::new(MemoryStore::new()));

        let listed = svc.cities(&CityFilter::default()).await;
        assert_eq!(listed.fallback_reason(), Some(FallbackReason::Empty));

        let delhi = assert_ok!(svc.city(1).await);
        assert_eq!(delhi.fallback_reason(), Some(FallbackReason::Empty));
        assert_eq!(delhi.value().name, "Delhi");

        // The catalogue city is known, but the empty store refuses the write
        let refreshed = assert_ok!(svc.refresh_current(1).await);
        assert_eq!(refreshed.fallback_reason(), Some(FallbackReason::StoreError));

        assert_eq!(svc.city(5000).await, Err(ServiceError::CityNotFound(5000)));
    }

    #[tokio::test]
    async fn test_slow_store_times_out_to_fallback() {
        // ---
        let store = FlakyStore {
            stall: Some(Duration::from_secs(2)),
            ..FlakyStore::new(MemoryStore::seeded())
        };
        let svc = service(Arc::new(store));

        let current = svc.current(1).await;
        assert_eq!(current.fallback_reason(), Some(FallbackReason::Timeout));

        let forecast = assert_ok!(svc.forecast(1, 2, false).await);
        assert_eq!(forecast.fallback_reason(), Some(FallbackReason::Timeout));
        assert_eq!(forecast.value().len(), 2);
    }

    #[tokio::test]
    async fn test_stored_history_is_preferred() {
        // ---
        let svc = service(Arc::new(store_with_history(3, &[90, 95, 99]).await));

        let history = assert_ok!(svc.historical(3, 7).await);
        assert!(!history.is_fallback());
        let values: Vec<_> = history.value().iter().map(|r| r.aqi_value).collect();
        assert_eq!(values, vec![90, 95, 99]);

        let current = svc.current(3).await;
        assert_eq!(current, Sourced::Store(history.into_value().pop().unwrap()));

        // Other cities have nothing stored
        let empty = assert_ok!(svc.historical(4, 7).await);
        assert_eq!(empty.fallback_reason(), Some(FallbackReason::Empty));
    }

    #[tokio::test]
    async fn test_refresh_current_stores_live_reading() {
        // ---
        let store = Arc::new(MemoryStore::seeded());
        let svc = service(store.clone());

        let refreshed = assert_ok!(svc.refresh_current(1).await);
        assert!(!refreshed.is_fallback());
        assert_eq!(
            refreshed.value().station_name.as_deref(),
            Some("Delhi Central")
        );
        assert!((160..=200).contains(&refreshed.value().aqi_value));

        let latest = store.latest_reading(1).await.unwrap().unwrap();
        assert_eq!(&latest, refreshed.value());
    }

    #[tokio::test]
    async fn test_refresh_without_store_uses_catalogue() {
        // ---
        let svc = service(Arc::new(UnconfiguredStore));

        let refreshed = assert_ok!(svc.refresh_current(61).await);
        assert_eq!(refreshed.fallback_reason(), Some(FallbackReason::NotConfigured));
        assert_eq!(
            refreshed.value().station_name.as_deref(),
            Some("Kullu Central")
        );

        let err = assert_err!(svc.refresh_current(5000).await);
        assert_eq!(err, ServiceError::CityNotFound(5000));
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_found() {
        // ---
        let svc = service(Arc::new(MemoryStore::seeded()));
        assert_eq!(svc.city(999).await, Err(ServiceError::CityNotFound(999)));

        let delhi = assert_ok!(svc.city(1).await);
        assert_eq!(delhi.value().name, "Delhi");

        // Baseline estimation for the same id still works
        let history = assert_ok!(svc.historical(999, 3).await);
        assert!(history.value().iter().all(|r| r.aqi_value >= 10));
    }

    #[tokio::test]
    async fn test_invalid_input() {
        // ---
        let svc = service(Arc::new(UnconfiguredStore));
        assert_eq!(
            svc.historical(1, 0).await,
            Err(ServiceError::InvalidDays(0))
        );
        assert_eq!(
            svc.forecast(1, -3, false).await,
            Err(ServiceError::InvalidDays(-3))
        );
        assert_eq!(
            svc.historical(1, MAX_DAYS + 1).await,
            Err(ServiceError::InvalidDays(MAX_DAYS + 1))
        );
        assert_eq!(svc.advisory(-1).await, Err(ServiceError::InvalidAqi(-1)));
        assert_eq!(
            ServiceError::InvalidDays(0).to_string(),
            "days must be between 1 and 365, got 0"
        );
    }

    #[tokio::test]
    async fn test_advisory_gap_is_reported_as_fallback() {
        // ---
        let svc = service(Arc::new(MemoryStore::new()));
        let result = assert_ok!(svc.advisory(120).await);
        assert_eq!(result.fallback_reason(), Some(FallbackReason::Empty));
        assert_eq!(result.value().category.as_str(), "Moderate");

        let svc = service(Arc::new(MemoryStore::seeded()));
        let result = assert_ok!(svc.advisory(120).await);
        assert!(!result.is_fallback());
    }

    #[tokio::test]
    async fn test_city_filter_applies_to_store_data() {
        // ---
        let svc = service(Arc::new(MemoryStore::seeded()));
        let filter = CityFilter {
            state: Some("Kerala".to_string()),
            ..Default::default()
        };
        let kerala = svc.cities(&filter).await;
        assert!(!kerala.is_fallback());
        assert_eq!(kerala.value().len(), 4);
    }
}
