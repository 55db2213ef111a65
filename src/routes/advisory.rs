//! Health advisory endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{ApiResponse, AppError, SharedService};
use crate::advisory::AdvisoryView;

// ---

pub fn router() -> Router<SharedService> {
    Router::new().route("/api/health/advisory", get(get_advisory))
}

#[derive(Debug, Deserialize)]
struct AdvisoryQuery {
    aqi: i32,
}

/// `GET /api/health/advisory?aqi=N`
async fn get_advisory(
    query: Result<Query<AdvisoryQuery>, QueryRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<AdvisoryView>>, AppError> {
    // ---
    let Query(params) = query?;
    info!("GET /api/health/advisory - aqi={}", params.aqi);
    let advisory = service.advisory(params.aqi).await?;
    Ok(Json(advisory.into()))
}
