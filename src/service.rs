//! Cloud sea prediction service
//!
//! Ties the observation adapters to the pure predictor. Two call paths
//! share the same scoring function:
//!
//! - the form path takes a caller-supplied observation, validates it and
//!   scores it;
//! - the Observatory path builds an observation from the per-station
//!   weather map, scores it and appends a data-provenance note to the
//!   advisory.
//!
//! Routine missing station fields were already defaulted when the map was
//! built. A location missing from the map entirely surfaces as
//! [`CloudSeaError::DataUnavailable`], never as a defaulted prediction.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cache;
use crate::config::CloudSeaConfig;
use crate::error::CloudSeaError;
use crate::models::{Observation, Prediction};
use crate::predictor;
use crate::sites;
use crate::weather::open_meteo::ObservationInputs;
use crate::weather::{self, HkoClient, LocationWeather, ObservationSource, OpenMeteoClient};

/// An Observatory-driven prediction together with the station weather it
/// was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPrediction {
    /// Station the prediction applies to
    pub place: String,
    /// The assembled station weather
    pub weather: LocationWeather,
    /// The scored prediction, advisory annotated with provenance
    pub prediction: Prediction,
}

/// Application service combining upstream clients, cache and predictor
#[derive(Clone)]
pub struct CloudSeaService {
    config: CloudSeaConfig,
    hko: HkoClient,
    open_meteo: OpenMeteoClient,
}

impl CloudSeaService {
    #[must_use]
    pub fn new(config: CloudSeaConfig) -> Self {
        // Both upstream clients share one HTTP client carrying the
        // configured timeout and retry budget
        let client = weather::build_http_client(&config.upstream);
        let hko = HkoClient::new(config.upstream.hko_base_url.clone(), client.clone());
        let open_meteo =
            OpenMeteoClient::new(config.upstream.open_meteo_base_url.clone(), client);
        Self {
            config,
            hko,
            open_meteo,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CloudSeaConfig {
        &self.config
    }

    /// The per-station weather map, served from cache while fresh.
    #[instrument(skip(self))]
    pub async fn weather_map(&self) -> Result<HashMap<String, LocationWeather>, CloudSeaError> {
        if cache::is_initialized() {
            match cache::load_weather_map().await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => warn!("Weather map cache read failed: {e:#}"),
            }
        }

        let map = self.hko.weather_map(&self.config.observation).await?;
        info!(stations = map.len(), "Fetched fresh Observatory weather map");

        if cache::is_initialized() {
            let ttl = cache::ttl_with_jitter(Duration::from_secs(
                u64::from(self.config.cache.ttl_minutes) * 60,
            ));
            if let Err(e) = cache::store_weather_map(map.clone(), ttl).await {
                warn!("Weather map cache write failed: {e:#}");
            }
        }

        Ok(map)
    }

    /// Observatory-driven prediction for a named location.
    #[instrument(skip(self))]
    pub async fn predict_for_location(
        &self,
        location: &str,
    ) -> Result<LocationPrediction, CloudSeaError> {
        let map = self.weather_map().await?;
        predict_from_map(&map, location)
    }

    /// Observatory-driven prediction for the configured default location.
    pub async fn predict_default(&self) -> Result<LocationPrediction, CloudSeaError> {
        let location = self.config.observation.default_location.clone();
        self.predict_for_location(&location).await
    }

    /// Form-driven prediction: validate the caller's observation, then
    /// score it.
    pub fn predict_from_observation(
        &self,
        observation: &Observation,
    ) -> Result<Prediction, CloudSeaError> {
        observation.validate()?;
        Ok(predictor::predict(observation))
    }

    /// Realtime prediction for a registered viewing site, built entirely
    /// from Open-Meteo point readings. Surface readings cannot see an
    /// inversion aloft, so this path scores without one; the form flow is
    /// the place to supply sounding data.
    #[instrument(skip(self))]
    pub async fn predict_for_site(&self, site_key: &str) -> Result<Prediction, CloudSeaError> {
        let site = sites::find_site(site_key)
            .ok_or_else(|| CloudSeaError::validation(format!("Unknown viewing site: {site_key}")))?;
        let observation = self.open_meteo.observe(&site).await?;
        Ok(predictor::predict(&observation))
    }

    /// Open-Meteo autofill inputs for a registered viewing site.
    #[instrument(skip(self))]
    pub async fn observation_inputs(
        &self,
        site_key: &str,
    ) -> Result<ObservationInputs, CloudSeaError> {
        let site = sites::find_site(site_key)
            .ok_or_else(|| CloudSeaError::validation(format!("Unknown viewing site: {site_key}")))?;
        self.open_meteo
            .current_conditions(site.latitude, site.longitude)
            .await
            .map_err(|e| CloudSeaError::api(format!("{e:#}")))
    }
}

/// Score a named location from an already-built weather map.
///
/// Accepts the Observatory station name or a registered site's id or
/// English name. A location absent from the map is a hard error so
/// callers can tell "no data right now" apart from a low score.
pub fn predict_from_map(
    map: &HashMap<String, LocationWeather>,
    location: &str,
) -> Result<LocationPrediction, CloudSeaError> {
    let place = resolve_place(map, location)
        .ok_or_else(|| CloudSeaError::data_unavailable(location))?;
    let weather = &map[&place];

    let mut prediction = predictor::predict(&weather.to_observation());
    prediction.recommendation.push_str(&format!(
        " (source: Hong Kong Observatory, updated {})",
        weather.update_time
    ));

    Ok(LocationPrediction {
        place,
        weather: weather.clone(),
        prediction,
    })
}

/// Map a requested location onto a station key present in the map
fn resolve_place(map: &HashMap<String, LocationWeather>, location: &str) -> Option<String> {
    let trimmed = location.trim();
    if map.contains_key(trimmed) {
        return Some(trimmed.to_string());
    }
    // Registered sites are addressable by id or English name too
    let site = sites::find_site(trimmed)?;
    map.contains_key(&site.name_zh).then(|| site.name_zh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindDirection;
    use crate::weather::hko::{DataProvenance, FieldSource};

    fn station(place: &str, observation_height: f64) -> LocationWeather {
        LocationWeather {
            place: place.to_string(),
            temperature: 12.0,
            humidity: 98.0,
            wind_speed: 15.0,
            wind_direction: WindDirection::SE,
            dew_point: 11.7,
            temperature_dew_point_diff: 0.3,
            has_inversion_layer: true,
            inversion_layer_height: 300.0,
            observation_height,
            update_time: "2024-01-15 07:00".to_string(),
            fog_alert: true,
            provenance: DataProvenance {
                temperature: FieldSource::Observed,
                humidity: FieldSource::Observed,
                wind: FieldSource::Default,
            },
        }
    }

    fn map() -> HashMap<String, LocationWeather> {
        HashMap::from([("大帽山".to_string(), station("大帽山", 957.0))])
    }

    #[test]
    fn test_prediction_carries_provenance_note() {
        let result = predict_from_map(&map(), "大帽山").unwrap();
        assert_eq!(result.place, "大帽山");
        assert!(result.prediction.has_cloud_sea);
        assert!(
            result
                .prediction
                .recommendation
                .contains("source: Hong Kong Observatory, updated 2024-01-15 07:00")
        );
    }

    #[test]
    fn test_registered_site_resolves_by_english_name() {
        let result = predict_from_map(&map(), "Tai Mo Shan").unwrap();
        assert_eq!(result.place, "大帽山");
        let result = predict_from_map(&map(), "tai-mo-shan").unwrap();
        assert_eq!(result.place, "大帽山");
    }

    #[test]
    fn test_absent_location_is_a_hard_error() {
        let empty: HashMap<String, LocationWeather> = HashMap::new();
        let err = predict_from_map(&empty, "大帽山").unwrap_err();
        assert!(matches!(
            err,
            CloudSeaError::DataUnavailable { ref location } if location == "大帽山"
        ));
    }

    #[test]
    fn test_unknown_location_is_not_defaulted() {
        // A location the Observatory never publishes must not silently
        // score against default weather
        let err = predict_from_map(&map(), "Mount Fuji").unwrap_err();
        assert!(matches!(err, CloudSeaError::DataUnavailable { .. }));
    }

    #[test]
    fn test_service_builds_clients_from_config() {
        // Upstream timeout and retry settings flow into the HTTP client
        // at construction; non-default values must be accepted
        let mut config = CloudSeaConfig::default();
        config.upstream.timeout_seconds = 5;
        config.upstream.max_retries = 0;
        let service = CloudSeaService::new(config);
        assert_eq!(service.config().upstream.timeout_seconds, 5);
        assert_eq!(service.config().upstream.max_retries, 0);
    }

    #[test]
    fn test_form_prediction_validates_input() {
        let service = CloudSeaService::new(CloudSeaConfig::default());
        let mut obs = station("大帽山", 957.0).to_observation();
        assert!(service.predict_from_observation(&obs).is_ok());

        obs.humidity = 130.0;
        let err = service.predict_from_observation(&obs).unwrap_err();
        assert!(matches!(err, CloudSeaError::Validation { .. }));
    }
}
