//! Process-local store backed by tokio `RwLock`s.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{AirQualityStore, StoreError, StoreResult};
use crate::advisory::builtin_advisories;
use crate::cities::builtin_cities;
use crate::models::{City, Forecast, HealthAdvisory, Reading};

// ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    cities: RwLock<Vec<City>>,
    readings: RwLock<HashMap<i32, Vec<Reading>>>,
    forecasts: RwLock<BTreeMap<(i32, NaiveDate), Forecast>>,
    advisories: RwLock<Vec<HealthAdvisory>>,
}

impl MemoryStore {
    // ---
    /// Empty store: no cities, readings, forecasts or advisories.
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the built-in cities and advisories.
    pub fn seeded() -> Self {
        // ---
        Self {
            cities: RwLock::new(builtin_cities()),
            advisories: RwLock::new(builtin_advisories()),
            ..Self::default()
        }
    }

    /// Writes must reference a known city, as the `cities` foreign keys
    /// require in Postgres.
    async fn check_city(&self, city_id: i32) -> StoreResult<()> {
        // ---
        if self.cities.read().await.iter().any(|c| c.id == city_id) {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!("unknown city {city_id}")))
        }
    }

    /// Number of stored forecasts across all cities.
    #[cfg(test)]
    pub async fn forecast_count(&self) -> usize {
        self.forecasts.read().await.len()
    }
}

#[async_trait]
impl AirQualityStore for MemoryStore {
    // ---
    fn is_available(&self) -> bool {
        true
    }

    async fn list_cities(&self) -> StoreResult<Vec<City>> {
        Ok(self.cities.read().await.clone())
    }

    async fn find_city(&self, id: i32) -> StoreResult<Option<City>> {
        Ok(self.cities.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn latest_reading(&self, city_id: i32) -> StoreResult<Option<Reading>> {
        // ---
        let readings = self.readings.read().await;
        Ok(readings
            .get(&city_id)
            .and_then(|rs| rs.iter().max_by_key(|r| r.recorded_at))
            .cloned())
    }

    async fn readings_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        // ---
        let readings = self.readings.read().await;
        let mut out: Vec<Reading> = readings
            .get(&city_id)
            .map(|rs| rs.iter().filter(|r| r.recorded_at >= since).cloned().collect())
            .unwrap_or_default();
        out.sort_by_key(|r| r.recorded_at);
        Ok(out)
    }

    async fn advisory_for(&self, aqi: i32) -> StoreResult<Option<HealthAdvisory>> {
        // ---
        Ok(self
            .advisories
            .read()
            .await
            .iter()
            .find(|a| a.aqi_min <= aqi && aqi <= a.aqi_max)
            .cloned())
    }

    async fn forecasts_from(
        &self,
        city_id: i32,
        from: NaiveDate,
        limit: u32,
    ) -> StoreResult<Vec<Forecast>> {
        // ---
        let forecasts = self.forecasts.read().await;
        Ok(forecasts
            .range((city_id, from)..=(city_id, NaiveDate::MAX))
            .map(|(_, f)| f.clone())
            .take(limit as usize)
            .collect())
    }

    async fn upsert_forecast(&self, forecast: &Forecast) -> StoreResult<Forecast> {
        // ---
        self.check_city(forecast.city_id).await?;
        let key = (forecast.city_id, forecast.forecast_date);
        self.forecasts.write().await.insert(key, forecast.clone());
        Ok(forecast.clone())
    }

    async fn insert_reading(&self, reading: &Reading) -> StoreResult<Reading> {
        // ---
        self.check_city(reading.city_id).await?;
        let mut readings = self.readings.write().await;
        let next_id = readings.values().map(Vec::len).sum::<usize>() as i64 + 1;

        let mut stored = reading.clone();
        stored.id = next_id;
        readings.entry(reading.city_id).or_default().push(stored.clone());
        Ok(stored)
    }
}
