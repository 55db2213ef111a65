//! City listing endpoints.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::{ApiResponse, AppError, SharedService};
use crate::cities::{CityFilter, CityType};
use crate::models::City;

// ---

pub fn router() -> Router<SharedService> {
    // ---
    Router::new()
        .route("/api/cities", get(list_cities))
        .route("/api/cities/{id}", get(get_city))
}

/// City record with its display type.
#[derive(Debug, Serialize)]
struct CityView {
    #[serde(flatten)]
    city: City,
    city_type: CityType,
}

impl From<City> for CityView {
    fn from(city: City) -> Self {
        let city_type = CityType::of(&city);
        CityView { city, city_type }
    }
}

/// `GET /api/cities?state=&type=&search=`
async fn list_cities(
    query: Result<Query<CityFilter>, QueryRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<Vec<CityView>>>, AppError> {
    // ---
    let Query(filter) = query?;
    info!("GET /api/cities - filter: {:?}", filter);
    let cities = service
        .cities(&filter)
        .await
        .map(|cities| cities.into_iter().map(CityView::from).collect::<Vec<_>>());
    info!("Returning {} cities", cities.value().len());
    Ok(Json(cities.into()))
}

/// `GET /api/cities/{id}`
async fn get_city(
    path: Result<Path<i32>, PathRejection>,
    State(service): State<SharedService>,
) -> Result<Json<ApiResponse<CityView>>, AppError> {
    // ---
    let Path(id) = path?;
    info!("GET /api/cities/{}", id);
    let city = service.city(id).await?.map(CityView::from);
    Ok(Json(city.into()))
}
