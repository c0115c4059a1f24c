use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::CloudSeaError,
    models::{Observation, Prediction},
    service::{CloudSeaService, LocationPrediction},
    sites::{self, ViewingSite},
    weather::{LocationWeather, open_meteo::ObservationInputs},
};

/// JSON error body returned alongside non-2xx statuses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error_response(err: &CloudSeaError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        CloudSeaError::Validation { .. } => StatusCode::BAD_REQUEST,
        // Distinct from 400/500: the request was fine, the Observatory
        // just has nothing for that location right now
        CloudSeaError::DataUnavailable { .. } => StatusCode::NOT_FOUND,
        CloudSeaError::Api { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Request failed: {err:#}");
    }
    (
        status,
        Json(ApiError {
            error: err.user_message(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObservationQuery {
    pub site: String,
}

#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
}

/// A viewing site with its distance from the queried coordinate
#[derive(Debug, Serialize, Deserialize)]
pub struct NearestSite {
    pub site: ViewingSite,
    pub distance_km: f64,
}

pub fn router(service: Arc<CloudSeaService>) -> Router {
    Router::new()
        .route("/predict", post(post_predict))
        .route("/prediction", get(get_prediction))
        .route("/weather", get(get_weather))
        .route("/observation", get(get_observation))
        .route("/sites", get(get_sites))
        .route("/sites/nearest", get(get_nearest_site))
        .with_state(service)
}

/// Form-driven flow: score a caller-supplied observation
async fn post_predict(
    State(service): State<Arc<CloudSeaService>>,
    Json(observation): Json<Observation>,
) -> ApiResult<Prediction> {
    service
        .predict_from_observation(&observation)
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Observatory-driven flow for a named location (default when omitted)
async fn get_prediction(
    State(service): State<Arc<CloudSeaService>>,
    Query(query): Query<PredictionQuery>,
) -> ApiResult<LocationPrediction> {
    let result = match query.location {
        Some(location) => service.predict_for_location(&location).await,
        None => service.predict_default().await,
    };
    result.map(Json).map_err(|e| error_response(&e))
}

/// The full per-station weather map behind the district table
async fn get_weather(
    State(service): State<Arc<CloudSeaService>>,
) -> ApiResult<HashMap<String, LocationWeather>> {
    service
        .weather_map()
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Open-Meteo autofill inputs for a registered site
async fn get_observation(
    State(service): State<Arc<CloudSeaService>>,
    Query(query): Query<ObservationQuery>,
) -> ApiResult<ObservationInputs> {
    service
        .observation_inputs(&query.site)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

async fn get_sites() -> Json<Vec<ViewingSite>> {
    Json(sites::viewing_sites())
}

async fn get_nearest_site(Query(query): Query<NearestQuery>) -> ApiResult<NearestSite> {
    sites::nearest_site(query.lat, query.lon)
        .map(|(site, distance_km)| Json(NearestSite { site, distance_km }))
        .ok_or_else(|| error_response(&CloudSeaError::general("No viewing sites registered")))
}
