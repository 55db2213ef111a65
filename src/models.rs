//! Data models for cities, readings, forecasts and health advisories.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{classify, AqiCategory};

// ---

/// Reference data for a monitored city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    // ---
    pub id: i32,
    pub name: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    /// One of `rural`, `town`, `small_city`, `major_city` when known.
    pub category: Option<String>,
    pub population: Option<i64>,
    pub district: Option<String>,
}

/// A single AQI reading for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub id: i64,
    pub city_id: i32,
    pub station_name: Option<String>,
    pub aqi_value: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub nh3: f64,
    pub quality_category: String,
    pub recorded_at: DateTime<Utc>,
}

/// Illustrative weather inputs attached to a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherFactor {
    // ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Predicted AQI for one city and one target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Forecast {
    // ---
    pub city_id: i32,
    pub forecast_date: NaiveDate,
    pub predicted_aqi: i32,
    pub predicted_pm25: f64,
    pub confidence_score: f64,
    #[sqlx(json)]
    pub weather_factor: WeatherFactor,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

/// Range-keyed health advisory row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthAdvisory {
    // ---
    pub aqi_min: i32,
    pub aqi_max: i32,
    pub category: String,
    pub general_advice: String,
    pub sensitive_groups_advice: Option<String>,
    pub outdoor_activities: Option<String>,
    pub mask_recommendation: bool,
    pub air_purifier_recommendation: bool,
}

/// Pollutant selector for historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    #[default]
    Aqi,
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
    Nh3,
}

/// Fixed pollutant fractions of AQI used for synthesized readings:
/// PM2.5, PM10, NO2, SO2, CO, O3, NH3.
pub const POLLUTANT_FRACTIONS: [f64; 7] = [0.60, 0.80, 0.40, 0.20, 0.10, 0.30, 0.15];

impl Reading {
    // ---
    /// Build a reading whose pollutant values are derived from the AQI.
    pub fn from_aqi(
        id: i64,
        city_id: i32,
        station_name: impl Into<String>,
        aqi_value: i32,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        // ---
        let aqi = f64::from(aqi_value);
        let [pm25, pm10, no2, so2, co, o3, nh3] = POLLUTANT_FRACTIONS.map(|f| aqi * f);

        Reading {
            id,
            city_id,
            station_name: Some(station_name.into()),
            aqi_value,
            pm25,
            pm10,
            no2,
            so2,
            co,
            o3,
            nh3,
            quality_category: classify(aqi_value).category.as_str().to_string(),
            recorded_at,
        }
    }

    /// Category of this reading, recomputed from the AQI value.
    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_aqi(self.aqi_value)
    }
}

impl Pollutant {
    // ---
    pub fn value_of(self, reading: &Reading) -> f64 {
        match self {
            Pollutant::Aqi => f64::from(reading.aqi_value),
            Pollutant::Pm25 => reading.pm25,
            Pollutant::Pm10 => reading.pm10,
            Pollutant::No2 => reading.no2,
            Pollutant::So2 => reading.so2,
            Pollutant::Co => reading.co,
            Pollutant::O3 => reading.o3,
            Pollutant::Nh3 => reading.nh3,
        }
    }
}
