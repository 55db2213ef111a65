//! Current, historical and forecast AQI endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiResponse, AppError, SharedService};
use crate::advisory::AdvisoryView;
use crate::category::AqiCategory;
use crate::models::{Forecast, Pollutant, Reading, WeatherFactor};
use crate::Sourced;

// ---

const DEFAULT_HISTORY_DAYS: i64 = 30;
const DEFAULT_FORECAST_DAYS: i64 = 3;

pub fn router() -> Router<SharedService> {
    // ---
    Router::new()
        .route(
            "/api/aqi/current/{city_id}",
            get(get_current).post(refresh_current),
        )
        .route("/api/aqi/historical/{city_id}", get(get_historical))
        .route(
            "/api/aqi/forecast/{city_id}",
            get(get_forecast).post(regenerate_forecast),
        )
}

/// Compact reading shown on the dashboard header.
#[derive(Debug, Serialize)]
struct CurrentReading {
    aqi_value: i32,
    pm25: f64,
    pm10: f64,
    no2: f64,
    quality_category: String,
    recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CurrentAqi {
    aqi: CurrentReading,
    health_advisory: AdvisoryView,
}

#[derive(Debug, Deserialize)]
struct HistoricalQuery {
    days: Option<i64>,
    pollutant: Option<Pollutant>,
}

#[derive(Debug, PartialEq, Serialize)]
struct HistoricalPoint {
    date: NaiveDate,
    recorded_at: DateTime<Utc>,
    aqi: i32,
    pm25: f64,
    pm10: f64,
    no2: f64,
    category: String,
    /// Value of the selected pollutant.
    value: f64,
}

#[derive(Debug, PartialEq, Serialize)]
struct SeriesStats {
    min: f64,
    max: f64,
    avg: f64,
}

#[derive(Debug, Serialize)]
struct HistoricalSeries {
    city_id: i32,
    days: i64,
    pollutant: Pollutant,
    readings: Vec<HistoricalPoint>,
    stats: Option<SeriesStats>,
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ForecastRequest {
    days: Option<i64>,
    force_refresh: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ForecastView {
    date: NaiveDate,
    predicted_aqi: i32,
    predicted_pm25: f64,
    confidence: f64,
    category: AqiCategory,
    color_code: &'static str,
    weather_factors: WeatherFactor,
    model_version: String,
}

#[derive(Debug, Serialize)]
struct ForecastSeries {
    city_id: i32,
    forecasts: Vec<ForecastView>,
}

impl From<Reading> for CurrentReading {
    fn from(r: Reading) -> Self {
        CurrentReading {
            aqi_value: r.aqi_value,
            pm25: r.pm25,
            pm10: r.pm10,
            no2: r.no2,
            quality_category: r.quality_category,
            recorded_at: r.recorded_at,
        }
    }
}

impl From<Forecast> for ForecastView {
    fn from(f: Forecast) -> Self {
        // ---
        let category = AqiCategory::from_aqi(f.predicted_aqi);
        ForecastView {
            date: f.forecast_date,
            predicted_aqi: f.predicted_aqi,
            predicted_pm25: f.predicted_pm25,
            confidence: f.confidence_score,
            category,
            color_code: category.color_hex(),
            weather_factors: f.weather_factor,
            model_version: f.model_version,
        }
    }
}

fn historical_point(r: &Reading, pollutant: Pollutant) -> HistoricalPoint {
    // ---
    HistoricalPoint {
        date: r.recorded_at.date_naive(),
        recorded_at: r.recorded_at,
        aqi: r.aqi_value,
        pm25: r.pm25,
        pm10: r.pm10,
        no2: r.no2,
        category: r.quality_category.clone(),
        value: pollutant.value_of(r),
    }
}

fn series_stats(points: &[HistoricalPoint]) -> Option<SeriesStats> {
    // ---
    if points.is_empty() {
        return None;
    }
    let values = points.iter().map(|p| p.value);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.sum::<f64>() / points.len() as f64;
    Some(SeriesStats { min, max, avg })
}

/// `GET /api/aqi/current/{city_id}`
async fn get_current(
    path: Result<Path<i32>, PathRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<CurrentAqi>>, AppError> {
    // ---
    let Path(city_id) = path?;
    info!("GET /api/aqi/current/{}", city_id);
    let reading = service.current(city_id).await;
    current_response(&service, reading).await
}

/// `POST /api/aqi/current/{city_id}` - simulate and store a fresh reading.
async fn refresh_current(
    path: Result<Path<i32>, PathRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<CurrentAqi>>, AppError> {
    // ---
    let Path(city_id) = path?;
    info!("POST /api/aqi/current/{}", city_id);
    let reading = service.refresh_current(city_id).await?;
    current_response(&service, reading).await
}

async fn current_response(
    service: &SharedService,
    reading: Sourced<Reading>,
) -> Result<Json<ApiResponse<CurrentAqi>>, AppError> {
    // ---
    let health_advisory = service
        .advisory(reading.value().aqi_value)
        .await?
        .into_value();

    let body = reading.map(|r| CurrentAqi {
        aqi: r.into(),
        health_advisory,
    });
    Ok(Json(body.into()))
}

/// `GET /api/aqi/historical/{city_id}?days=30&pollutant=aqi`
async fn get_historical(
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<HistoricalQuery>, QueryRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<HistoricalSeries>>, AppError> {
    // ---
    let Path(city_id) = path?;
    let Query(params) = query?;
    info!("GET /api/aqi/historical/{} - {:?}", city_id, params);
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    let pollutant = params.pollutant.unwrap_or_default();

    let readings = service.historical(city_id, days).await?;
    debug!(
        "Historical readings: {} (fallback: {:?})",
        readings.value().len(),
        readings.fallback_reason()
    );

    let body = readings.map(|readings| {
        let points: Vec<_> = readings
            .iter()
            .map(|r| historical_point(r, pollutant))
            .collect();
        HistoricalSeries {
            city_id,
            days,
            pollutant,
            stats: series_stats(&points),
            readings: points,
        }
    });
    Ok(Json(body.into()))
}

/// `GET /api/aqi/forecast/{city_id}?days=3`
async fn get_forecast(
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<ForecastSeries>>, AppError> {
    // ---
    let Path(city_id) = path?;
    let Query(params) = query?;
    info!("GET /api/aqi/forecast/{} - {:?}", city_id, params);
    let days = params.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    forecast_response(&service, city_id, days, false).await
}

/// `POST /api/aqi/forecast/{city_id}` with `{ "days": 7, "force_refresh": true }`
async fn regenerate_forecast(
    path: Result<Path<i32>, PathRejection>,
    State(service): State<SharedService>,
    body: Result<Json<ForecastRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ForecastSeries>>, AppError> {
    // ---
    let Path(city_id) = path?;
    let Json(request) = body?;
    info!("POST /api/aqi/forecast/{} - {:?}", city_id, request);
    let days = request.days.unwrap_or(DEFAULT_FORECAST_DAYS);
    let force_refresh = request.force_refresh.unwrap_or(true);
    forecast_response(&service, city_id, days, force_refresh).await
}

async fn forecast_response(
    service: &SharedService,
    city_id: i32,
    days: i64,
    force_refresh: bool,
) -> Result<Json<ApiResponse<ForecastSeries>>, AppError> {
    // ---
    let forecasts = service.forecast(city_id, days, force_refresh).await?;
    let body = forecasts.map(|forecasts| ForecastSeries {
        city_id,
        forecasts: forecasts.into_iter().map(ForecastView::from).collect(),
    });
    Ok(Json(body.into()))
}
