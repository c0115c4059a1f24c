//! Upstream weather data integration
//!
//! Two observation sources feed the predictor: the Hong Kong Observatory
//! open-data API (per-station readings for the whole territory) and the
//! Open-Meteo forecast API (point readings used to autofill the manual
//! prediction form). Both produce the same observation shape; everything
//! the predictor needs is assembled here, never inside the predictor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::UpstreamConfig;
use crate::error::CloudSeaError;
use crate::models::Observation;
use crate::sites::ViewingSite;

pub mod hko;
pub mod open_meteo;

pub use hko::{HkoClient, LocationWeather};
pub use open_meteo::OpenMeteoClient;

/// HTTP client with transient-failure retries, shared by both upstream
/// clients. Timeout and retry budget come from the loaded configuration.
#[must_use]
pub fn build_http_client(config: &UpstreamConfig) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent("cloudsea/0.1.0")
        .build()
        .expect("Failed to create HTTP client");
    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Dew point in °C from air temperature and relative humidity, using the
/// Magnus approximation. Used whenever a station reports humidity but no
/// direct dew point reading.
#[must_use]
pub fn dew_point(temperature_c: f64, relative_humidity: f64) -> f64 {
    const A: f64 = 17.27;
    const B: f64 = 237.7;
    let alpha = (A * temperature_c) / (B + temperature_c) + (relative_humidity / 100.0).ln();
    (B * alpha) / (A - alpha)
}

/// A source that can produce a predictor-ready observation for a viewing
/// site. Implemented by the Open-Meteo client; the HKO path goes through
/// the per-station weather map instead.
#[async_trait]
pub trait ObservationSource {
    async fn observe(&self, site: &ViewingSite) -> Result<Observation, CloudSeaError>;
}
