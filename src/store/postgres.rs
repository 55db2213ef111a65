//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{AirQualityStore, StoreError, StoreResult};
use crate::models::{City, Forecast, HealthAdvisory, Reading};
use crate::{schema, Config};

// ---

/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

const READING_COLUMNS: &str = "id, city_id, station_name, aqi_value, pm25, pm10, no2, so2, co, o3, nh3, \
     quality_category, recorded_at";

const FORECAST_COLUMNS: &str = "city_id, forecast_date, predicted_aqi, predicted_pm25, confidence_score, \
     weather_factor, model_version, created_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Translate a sqlx error, recognising a missing table.
fn map_sqlx(e: sqlx::Error) -> StoreError {
    // ---
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(UNDEFINED_TABLE) {
            return StoreError::MissingTable(db.message().to_string());
        }
    }
    StoreError::Database(e)
}

impl PgStore {
    // ---
    /// Create a pool that connects on first use. Only fails when the URL
    /// itself cannot be parsed.
    pub fn connect_lazy(db_url: &str, cfg: &Config) -> Result<Self, sqlx::Error> {
        // ---
        let pool = PgPoolOptions::new()
            .max_connections(cfg.db_pool_max)
            .acquire_timeout(cfg.store_timeout)
            .connect_lazy(db_url)?;
        Ok(Self { pool })
    }

    /// Create tables and seed reference data.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        // ---
        tracing::info!("Bootstrapping database schema");
        schema::create_schema(&self.pool).await?;
        schema::seed_reference_data(&self.pool).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl AirQualityStore for PgStore {
    // ---
    fn is_available(&self) -> bool {
        !self.pool.is_closed()
    }

    async fn list_cities(&self) -> StoreResult<Vec<City>> {
        // ---
        sqlx::query_as::<_, City>(
            r#"
            SELECT id, name, state, latitude, longitude, category, population, district
            FROM cities
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn find_city(&self, id: i32) -> StoreResult<Option<City>> {
        // ---
        sqlx::query_as::<_, City>(
            r#"
            SELECT id, name, state, latitude, longitude, category, population, district
            FROM cities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn latest_reading(&self, city_id: i32) -> StoreResult<Option<Reading>> {
        // ---
        let sql = format!(
            "SELECT {READING_COLUMNS} FROM aqi_readings \
             WHERE city_id = $1 ORDER BY recorded_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Reading>(&sql)
            .bind(city_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn readings_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Reading>> {
        // ---
        let sql = format!(
            "SELECT {READING_COLUMNS} FROM aqi_readings \
             WHERE city_id = $1 AND recorded_at >= $2 ORDER BY recorded_at ASC"
        );
        sqlx::query_as::<_, Reading>(&sql)
            .bind(city_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn advisory_for(&self, aqi: i32) -> StoreResult<Option<HealthAdvisory>> {
        // ---
        sqlx::query_as::<_, HealthAdvisory>(
            r#"
            SELECT aqi_min, aqi_max, category, general_advice, sensitive_groups_advice,
                   outdoor_activities, mask_recommendation, air_purifier_recommendation
            FROM health_advisories
            WHERE aqi_min <= $1 AND aqi_max >= $1
            ORDER BY aqi_min
            LIMIT 1
            "#,
        )
        .bind(aqi)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)
    }

    async fn forecasts_from(
        &self,
        city_id: i32,
        from: NaiveDate,
        limit: u32,
    ) -> StoreResult<Vec<Forecast>> {
        // ---
        let sql = format!(
            "SELECT {FORECAST_COLUMNS} FROM aqi_forecasts \
             WHERE city_id = $1 AND forecast_date >= $2 \
             ORDER BY forecast_date ASC LIMIT $3"
        );
        sqlx::query_as::<_, Forecast>(&sql)
            .bind(city_id)
            .bind(from)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn upsert_forecast(&self, forecast: &Forecast) -> StoreResult<Forecast> {
        // ---
        let sql = format!(
            r#"
            INSERT INTO aqi_forecasts (
                city_id, forecast_date, predicted_aqi, predicted_pm25,
                confidence_score, weather_factor, model_version, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (city_id, forecast_date) DO UPDATE SET
                predicted_aqi    = EXCLUDED.predicted_aqi,
                predicted_pm25   = EXCLUDED.predicted_pm25,
                confidence_score = EXCLUDED.confidence_score,
                weather_factor   = EXCLUDED.weather_factor,
                model_version    = EXCLUDED.model_version,
                created_at       = EXCLUDED.created_at
            RETURNING {FORECAST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Forecast>(&sql)
            .bind(forecast.city_id)
            .bind(forecast.forecast_date)
            .bind(forecast.predicted_aqi)
            .bind(forecast.predicted_pm25)
            .bind(forecast.confidence_score)
            .bind(sqlx::types::Json(&forecast.weather_factor))
            .bind(&forecast.model_version)
            .bind(forecast.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn insert_reading(&self, reading: &Reading) -> StoreResult<Reading> {
        // ---
        let sql = format!(
            r#"
            INSERT INTO aqi_readings (
                city_id, station_name, aqi_value, pm25, pm10, no2, so2, co, o3, nh3,
                quality_category, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {READING_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Reading>(&sql)
            .bind(reading.city_id)
            .bind(&reading.station_name)
            .bind(reading.aqi_value)
            .bind(reading.pm25)
            .bind(reading.pm10)
            .bind(reading.no2)
            .bind(reading.so2)
            .bind(reading.co)
            .bind(reading.o3)
            .bind(reading.nh3)
            .bind(&reading.quality_category)
            .bind(reading.recorded_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }
}
