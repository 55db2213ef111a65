//! Short-term AQI forecast generation.
//!
//! Generation is pure: it takes the recent readings, the current date and an
//! injected random source and returns one [`Forecast`] per lead day, nearest
//! first. Persisting the result is the service layer's job.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::Rng;

use crate::baseline::BaselineTable;
use crate::models::{Forecast, Reading, WeatherFactor};
use crate::synth::{floored_aqi, perturbation, HISTORICAL_NOISE};

// ---

pub const TREND_MODEL_VERSION: &str = "v1.0";
pub const MOCK_MODEL_VERSION: &str = "mock";

/// Confidence attached to every mock forecast.
pub const MOCK_CONFIDENCE: f64 = 0.7;

/// Lowest confidence a trend forecast can report.
pub const MIN_CONFIDENCE: f64 = 0.6;

/// Number of most recent readings the trend is computed from.
const TREND_WINDOW: usize = 3;

const SEASONAL_AMPLITUDE: f64 = 20.0;
const TREND_NOISE: f64 = 15.0;

/// Mean and per-step slope of the last few readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub average: f64,
    pub slope: f64,
}

impl Trend {
    // ---
    /// Compute the trend over the last [`TREND_WINDOW`] readings, or `None`
    /// when there are no readings at all.
    pub fn from_readings(readings: &[Reading]) -> Option<Self> {
        // ---
        let window = &readings[readings.len().saturating_sub(TREND_WINDOW)..];
        let (first, last) = (window.first()?, window.last()?);

        let count = window.len() as f64;
        let average = window.iter().map(|r| f64::from(r.aqi_value)).sum::<f64>() / count;
        let slope = if window.len() > 1 {
            (f64::from(last.aqi_value) - f64::from(first.aqi_value)) / count
        } else {
            0.0
        };

        Some(Trend { average, slope })
    }
}

/// Seasonal adjustment for a target date; peaks in the winter months.
///
/// The month index is zero-based, so January contributes `sin(π/6)·20`.
pub fn seasonal_factor(date: NaiveDate) -> f64 {
    (f64::from(date.month0() + 1) * PI / 6.0).sin() * SEASONAL_AMPLITUDE
}

/// Confidence for a trend forecast `lead_day` days ahead.
pub fn trend_confidence(lead_day: u32) -> f64 {
    (1.0 - f64::from(lead_day) * 0.1).max(MIN_CONFIDENCE)
}

/// Forecast `days` days ahead of `today`.
///
/// Uses the trend of `recent` when it is non-empty, otherwise falls back to
/// [`mock_forecast`].
pub fn forecast<R: Rng + ?Sized>(
    baselines: &BaselineTable,
    city_id: i32,
    days: u32,
    recent: &[Reading],
    today: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Forecast> {
    // ---
    match Trend::from_readings(recent) {
        Some(trend) => trend_forecast(city_id, days, trend, today, now, rng),
        None => mock_forecast(baselines, city_id, days, today, now, rng),
    }
}

/// Trend extrapolation with a seasonal term and bounded noise.
pub fn trend_forecast<R: Rng + ?Sized>(
    city_id: i32,
    days: u32,
    trend: Trend,
    today: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Forecast> {
    // ---
    (1..=days)
        .map(|lead| {
            let target = today + Duration::days(i64::from(lead));
            let seasonal = seasonal_factor(target);
            let noise = perturbation(rng, TREND_NOISE);
            let predicted = floored_aqi(
                trend.average + trend.slope * f64::from(lead) + seasonal + noise,
            );

            let weather_factor = WeatherFactor {
                temperature: Some(25.0 + rng.random::<f64>() * 10.0),
                humidity: Some(60.0 + rng.random::<f64>() * 30.0),
                wind_speed: Some(5.0 + rng.random::<f64>() * 10.0),
            };

            Forecast {
                city_id,
                forecast_date: target,
                predicted_aqi: predicted,
                predicted_pm25: f64::from(predicted) * 0.6,
                confidence_score: trend_confidence(lead),
                weather_factor,
                model_version: TREND_MODEL_VERSION.to_string(),
                created_at: now,
            }
        })
        .collect()
}

/// Baseline-centred forecast used when no readings are available.
pub fn mock_forecast<R: Rng + ?Sized>(
    baselines: &BaselineTable,
    city_id: i32,
    days: u32,
    today: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Forecast> {
    // ---
    let base = f64::from(baselines.baseline_for_id(city_id));

    (1..=days)
        .map(|lead| {
            let predicted = floored_aqi(base + perturbation(rng, HISTORICAL_NOISE));
            let weather_factor = WeatherFactor {
                humidity: Some(60.0 + rng.random::<f64>() * 20.0),
                ..Default::default()
            };

            Forecast {
                city_id,
                forecast_date: today + Duration::days(i64::from(lead)),
                predicted_aqi: predicted,
                predicted_pm25: f64::from(predicted) * 0.6,
                confidence_score: MOCK_CONFIDENCE,
                weather_factor,
                model_version: MOCK_MODEL_VERSION.to_string(),
                created_at: now,
            }
        })
        .collect()
}
