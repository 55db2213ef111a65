//! Database schema management for `aqi-dashboard`.
//!
//! Ensures the four tables exist and that reference data (cities and health
//! advisories) is present. Applied once on startup by `PgStore::bootstrap`.

use anyhow::Result;
use sqlx::PgPool;

use crate::advisory::builtin_advisories;
use crate::cities::builtin_cities;

// ---

/// Create or update the database schema (idempotent).
///
/// Safe to call on every startup; no-op if objects already exist.
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cities (
            id          SERIAL PRIMARY KEY,
            name        TEXT             NOT NULL,
            state       TEXT             NOT NULL,
            latitude    DOUBLE PRECISION NOT NULL,
            longitude   DOUBLE PRECISION NOT NULL,
            category    TEXT,
            population  BIGINT,
            district    TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aqi_readings (
            id               BIGSERIAL PRIMARY KEY,
            city_id          INTEGER          NOT NULL REFERENCES cities (id),
            station_name     TEXT,
            aqi_value        INTEGER          NOT NULL,
            pm25             DOUBLE PRECISION NOT NULL DEFAULT 0,
            pm10             DOUBLE PRECISION NOT NULL DEFAULT 0,
            no2              DOUBLE PRECISION NOT NULL DEFAULT 0,
            so2              DOUBLE PRECISION NOT NULL DEFAULT 0,
            co               DOUBLE PRECISION NOT NULL DEFAULT 0,
            o3               DOUBLE PRECISION NOT NULL DEFAULT 0,
            nh3              DOUBLE PRECISION NOT NULL DEFAULT 0,
            quality_category TEXT             NOT NULL,
            recorded_at      TIMESTAMPTZ      NOT NULL,
            created_at       TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // At most one forecast per city and date; upserts key on this constraint
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aqi_forecasts (
            id               BIGSERIAL PRIMARY KEY,
            city_id          INTEGER          NOT NULL REFERENCES cities (id),
            forecast_date    DATE             NOT NULL,
            predicted_aqi    INTEGER          NOT NULL,
            predicted_pm25   DOUBLE PRECISION NOT NULL,
            confidence_score DOUBLE PRECISION NOT NULL,
            weather_factor   JSONB            NOT NULL DEFAULT '{}'::jsonb,
            model_version    TEXT             NOT NULL,
            created_at       TIMESTAMPTZ      NOT NULL DEFAULT now(),
            UNIQUE (city_id, forecast_date)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS health_advisories (
            id                          SERIAL PRIMARY KEY,
            aqi_min                     INTEGER NOT NULL UNIQUE,
            aqi_max                     INTEGER NOT NULL,
            category                    TEXT    NOT NULL,
            general_advice              TEXT    NOT NULL,
            sensitive_groups_advice     TEXT,
            outdoor_activities          TEXT,
            mask_recommendation         BOOLEAN NOT NULL DEFAULT FALSE,
            air_purifier_recommendation BOOLEAN NOT NULL DEFAULT FALSE,
            CHECK (aqi_min <= aqi_max)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_aqi_readings_city_recorded
            ON aqi_readings (city_id, recorded_at);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Insert the built-in cities and advisories where missing (idempotent).
pub async fn seed_reference_data(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for city in builtin_cities() {
        sqlx::query(
            r#"
            INSERT INTO cities (id, name, state, latitude, longitude, category, population, district)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(city.id)
        .bind(&city.name)
        .bind(&city.state)
        .bind(city.latitude)
        .bind(city.longitude)
        .bind(&city.category)
        .bind(city.population)
        .bind(&city.district)
        .execute(&mut *tx)
        .await?;
    }

    // Explicit ids leave the serial behind
    sqlx::query(
        r#"
        SELECT setval(pg_get_serial_sequence('cities', 'id'), COALESCE(MAX(id), 1))
        FROM cities
        "#,
    )
    .execute(&mut *tx)
    .await?;

    for advisory in builtin_advisories() {
        sqlx::query(
            r#"
            INSERT INTO health_advisories (
                aqi_min, aqi_max, category, general_advice, sensitive_groups_advice,
                outdoor_activities, mask_recommendation, air_purifier_recommendation
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (aqi_min) DO NOTHING
            "#,
        )
        .bind(advisory.aqi_min)
        .bind(advisory.aqi_max)
        .bind(&advisory.category)
        .bind(&advisory.general_advice)
        .bind(&advisory.sensitive_groups_advice)
        .bind(&advisory.outdoor_activities)
        .bind(advisory.mask_recommendation)
        .bind(advisory.air_purifier_recommendation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
