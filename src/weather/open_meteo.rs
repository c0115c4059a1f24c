//! Open-Meteo current-conditions integration
//!
//! Point readings for a viewing site's coordinates, used to autofill the
//! manual prediction form. Open-Meteo reports a direct dew point, so no
//! Magnus fallback is needed on this path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::CloudSeaError;
use crate::models::{Observation, WindDirection};
use crate::sites::ViewingSite;
use crate::weather::ObservationSource;

/// Forecast response carrying current conditions
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: Option<CurrentConditions>,
}

/// Current conditions block from the Open-Meteo forecast endpoint
#[derive(Debug, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: f64,
    #[serde(rename = "dew_point_2m")]
    pub dew_point: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction_degrees: f64,
}

/// Measured fields for autofilling the prediction form. Inversion fields
/// stay user-supplied: surface readings cannot see the layer aloft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationInputs {
    pub temperature: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_direction: WindDirection,
    pub temperature_dew_point_diff: f64,
}

impl From<&CurrentConditions> for ObservationInputs {
    fn from(current: &CurrentConditions) -> Self {
        Self {
            temperature: current.temperature,
            humidity: current.humidity,
            dew_point: current.dew_point,
            wind_speed: current.wind_speed,
            wind_direction: WindDirection::from_degrees(current.wind_direction_degrees),
            temperature_dew_point_diff: (current.temperature - current.dew_point).abs(),
        }
    }
}

/// Client for the Open-Meteo forecast API (no API key required)
#[derive(Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    client: ClientWithMiddleware,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(base_url: String, client: ClientWithMiddleware) -> Self {
        Self { base_url, client }
    }

    /// Fetch current conditions for a coordinate
    #[instrument(skip(self))]
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ObservationInputs> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,dew_point_2m,wind_speed_10m,wind_direction_10m",
            self.base_url, latitude, longitude
        );
        debug!("Fetching Open-Meteo current conditions");

        let response = self.client.get(url).send().await?;
        let forecast: ForecastResponse = response
            .error_for_status()
            .context("Open-Meteo request failed")?
            .json()
            .await
            .context("Failed to parse Open-Meteo forecast response")?;

        let current = forecast
            .current
            .context("Open-Meteo response has no current conditions block")?;
        Ok(ObservationInputs::from(&current))
    }
}

#[async_trait]
impl ObservationSource for OpenMeteoClient {
    /// A full observation for a registered viewing site. Measured fields
    /// come from Open-Meteo; the inversion fields default to "none seen"
    /// and the observation height comes from the site registry.
    async fn observe(&self, site: &ViewingSite) -> Result<Observation, CloudSeaError> {
        let inputs = self
            .current_conditions(site.latitude, site.longitude)
            .await
            .map_err(|e| CloudSeaError::api(format!("{e:#}")))?;

        Ok(Observation {
            humidity: inputs.humidity,
            wind_speed: inputs.wind_speed,
            wind_direction: inputs.wind_direction,
            temperature_dew_point_diff: inputs.temperature_dew_point_diff,
            has_inversion_layer: false,
            inversion_layer_height: 0.0,
            observation_height: site.elevation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_conditions_parsing() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 22.4,
                "longitude": 114.125,
                "current": {
                    "temperature_2m": 12.3,
                    "relative_humidity_2m": 97.0,
                    "dew_point_2m": 11.9,
                    "wind_speed_10m": 14.2,
                    "wind_direction_10m": 120.0
                }
            }"#,
        )
        .unwrap();

        let inputs = ObservationInputs::from(&response.current.unwrap());
        assert_eq!(inputs.humidity, 97.0);
        assert_eq!(inputs.wind_speed, 14.2);
        // 120° sits in the SE octant
        assert_eq!(inputs.wind_direction, WindDirection::SE);
        assert!((inputs.temperature_dew_point_diff - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_spread_is_never_negative() {
        let current = CurrentConditions {
            temperature: 10.0,
            humidity: 100.0,
            dew_point: 10.3, // supersaturated reading
            wind_speed: 5.0,
            wind_direction_degrees: 90.0,
        };
        let inputs = ObservationInputs::from(&current);
        assert!(inputs.temperature_dew_point_diff >= 0.0);
    }
}
