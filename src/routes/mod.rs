use std::sync::Arc;

use axum::Router;

use crate::AirQualityService;

mod advisory;
mod aqi;
mod cities;
mod error;
mod health;
mod response;

pub use error::AppError;
pub use response::ApiResponse;

/// State shared by every route.
pub type SharedService = Arc<AirQualityService>;

// ---

pub fn router(service: SharedService) -> Router {
    // ---
    Router::new()
        .merge(cities::router())
        .merge(aqi::router())
        .merge(advisory::router())
        .merge(health::router())
        .with_state(service)
}
