// src/routes/health.rs
//! API health check endpoint for the air quality backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is running and able to respond
//! to HTTP requests. It reports whether a backing store is configured but does
//! not query it.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::SharedService;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

/// Handle `GET /health`.
async fn health(State(service): State<SharedService>) -> Json<HealthResponse> {
    // ---
    let store = if service.store_available() {
        "available"
    } else {
        "unavailable"
    };
    Json(HealthResponse {
        status: "ok",
        store,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<SharedService> {
    Router::new().route("/health", get(health))
}
