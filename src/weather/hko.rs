//! Hong Kong Observatory open-data integration
//!
//! Fetches the current weather report (`rhrread`), visibility (`LTMV`)
//! and warning summary (`warnsum`) endpoints concurrently and assembles a
//! per-station weather map shaped for the cloud sea predictor.
//!
//! Missing fields are routine in the Observatory feed: not every station
//! reports wind or humidity, so configured defaults fill those gaps and
//! the per-field provenance records what was substituted. A station that
//! is absent from the payload entirely is a different matter and is
//! surfaced as a hard error by the service layer.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Asia::Hong_Kong;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ObservationConfig;
use crate::error::CloudSeaError;
use crate::models::{Observation, WindDirection};
use crate::weather::dew_point;

/// Visibility below which a surface inversion is assumed present
const INVERSION_VISIBILITY_M: f64 = 1000.0;
/// Visibility assumed when the endpoint returns no readings
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

/// Current weather report (`rhrread`) payload
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub temperature: Option<ReadingSet>,
    #[serde(default)]
    pub humidity: Option<ReadingSet>,
    #[serde(default)]
    pub wind: Option<WindSet>,
    #[serde(rename = "updateTime", default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingSet {
    #[serde(default)]
    pub data: Vec<Reading>,
}

/// A single per-station reading
#[derive(Debug, Clone, Deserialize)]
pub struct Reading {
    pub place: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindSet {
    #[serde(default)]
    pub data: Vec<WindReading>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindReading {
    pub place: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Visibility (`LTMV`) payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisibilityResponse {
    #[serde(default)]
    pub data: Vec<VisibilityReading>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityReading {
    pub value: f64,
}

/// Where a field's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSource {
    /// Reported by the station itself
    Observed,
    /// Substituted from configured defaults
    Default,
}

/// Per-field provenance for one station's assembled weather
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProvenance {
    pub temperature: FieldSource,
    pub humidity: FieldSource,
    pub wind: FieldSource,
}

/// Assembled weather for one Observatory station, predictor-ready
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationWeather {
    /// Station name as published by the Observatory
    pub place: String,
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction octant
    pub wind_direction: WindDirection,
    /// Dew point in °C (Magnus, from temperature and humidity)
    pub dew_point: f64,
    /// Temperature minus dew point in °C
    pub temperature_dew_point_diff: f64,
    /// Inversion inferred from territory-wide visibility
    pub has_inversion_layer: bool,
    /// Estimated inversion layer height in meters
    pub inversion_layer_height: f64,
    /// Station elevation in meters
    pub observation_height: f64,
    /// Report time, Hong Kong local, `yyyy-MM-dd HH:mm`
    pub update_time: String,
    /// Dense fog warning currently in force
    pub fog_alert: bool,
    /// Which fields were observed vs. defaulted
    pub provenance: DataProvenance,
}

impl LocationWeather {
    /// The predictor input for this station
    #[must_use]
    pub fn to_observation(&self) -> Observation {
        Observation {
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
            temperature_dew_point_diff: self.temperature_dew_point_diff,
            has_inversion_layer: self.has_inversion_layer,
            inversion_layer_height: self.inversion_layer_height,
            observation_height: self.observation_height,
        }
    }
}

/// Client for the Observatory open-data API
#[derive(Clone)]
pub struct HkoClient {
    base_url: String,
    client: ClientWithMiddleware,
}

impl HkoClient {
    #[must_use]
    pub fn new(base_url: String, client: ClientWithMiddleware) -> Self {
        Self { base_url, client }
    }

    /// Fetch the current weather report
    #[instrument(skip(self))]
    pub async fn current_weather(&self) -> Result<CurrentWeatherResponse> {
        let url = format!("{}/weather.php?dataType=rhrread&lang=tc", self.base_url);
        debug!("Fetching HKO current weather report");
        let response = self.client.get(url).send().await?;
        response
            .error_for_status()
            .context("HKO current weather request failed")?
            .json()
            .await
            .context("Failed to parse HKO current weather response")
    }

    /// Fetch the latest ten-minute visibility readings
    #[instrument(skip(self))]
    pub async fn visibility(&self) -> Result<VisibilityResponse> {
        let url = format!(
            "{}/opendata.php?dataType=LTMV&lang=tc&rformat=json",
            self.base_url
        );
        debug!("Fetching HKO visibility data");
        let response = self.client.get(url).send().await?;
        response
            .error_for_status()
            .context("HKO visibility request failed")?
            .json()
            .await
            .context("Failed to parse HKO visibility response")
    }

    /// Fetch the weather warning summary
    #[instrument(skip(self))]
    pub async fn warnings(&self) -> Result<Value> {
        let url = format!("{}/weather.php?dataType=warnsum&lang=tc", self.base_url);
        debug!("Fetching HKO warning summary");
        let response = self.client.get(url).send().await?;
        response
            .error_for_status()
            .context("HKO warning summary request failed")?
            .json()
            .await
            .context("Failed to parse HKO warning summary")
    }

    /// Fetch all three endpoints concurrently and assemble the
    /// per-station weather map.
    #[instrument(skip(self, config))]
    pub async fn weather_map(
        &self,
        config: &ObservationConfig,
    ) -> Result<HashMap<String, LocationWeather>, CloudSeaError> {
        let (current, visibility, warnings) = futures::try_join!(
            self.current_weather(),
            self.visibility(),
            self.warnings()
        )
        .map_err(|e| CloudSeaError::api(format!("Failed to fetch Observatory data: {e:#}")))?;

        let visibility_m = extract_visibility(&visibility);
        let fog = fog_warning_in_force(&warnings);
        build_weather_map(&current, visibility_m, fog, config)
    }
}

/// Lowest reported visibility in meters, or the clear-air default
#[must_use]
pub fn extract_visibility(response: &VisibilityResponse) -> f64 {
    response
        .data
        .first()
        .map_or(DEFAULT_VISIBILITY_M, |reading| reading.value)
}

/// Whether the warning summary mentions dense fog
#[must_use]
pub fn fog_warning_in_force(warnings: &Value) -> bool {
    fn mentions_fog(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.iter().any(|(key, v)| {
                (key.as_str() == "name"
                    && v.as_str()
                        .is_some_and(|s| s.contains("濃霧") || s.to_lowercase().contains("fog")))
                    || mentions_fog(v)
            }),
            Value::Array(items) => items.iter().any(mentions_fog),
            _ => false,
        }
    }
    mentions_fog(warnings)
}

/// Assemble the per-station weather map from raw payloads.
///
/// Pure apart from logging, so tests can drive it with canned payloads.
pub fn build_weather_map(
    current: &CurrentWeatherResponse,
    visibility_m: f64,
    fog_alert: bool,
    config: &ObservationConfig,
) -> Result<HashMap<String, LocationWeather>, CloudSeaError> {
    let temperature_readings = current
        .temperature
        .as_ref()
        .map(|set| set.data.as_slice())
        .unwrap_or_default();

    if temperature_readings.is_empty() {
        return Err(CloudSeaError::api(
            "Observatory temperature data is missing from the current weather report",
        ));
    }

    let update_time = current
        .update_time
        .as_deref()
        .map(format_hong_kong_time)
        .unwrap_or_default();

    let has_inversion = visibility_m < INVERSION_VISIBILITY_M;

    let mut map = HashMap::new();
    for temp in temperature_readings {
        let place = temp.place.clone();

        let humidity_reading = current
            .humidity
            .as_ref()
            .and_then(|set| set.data.iter().find(|r| r.place == place));
        let wind_reading = current
            .wind
            .as_ref()
            .and_then(|set| set.data.iter().find(|r| r.place == place));

        let humidity = humidity_reading.map_or(config.default_humidity, |r| r.value);

        let (wind_speed, wind_direction, wind_source) = match wind_reading {
            Some(reading) => (
                reading.value.unwrap_or(config.default_wind_speed),
                reading
                    .direction
                    .as_deref()
                    .and_then(parse_direction)
                    .unwrap_or(config.default_wind_direction),
                FieldSource::Observed,
            ),
            None => (
                config.default_wind_speed,
                config.default_wind_direction,
                FieldSource::Default,
            ),
        };

        let dew = dew_point(temp.value, humidity);

        map.insert(
            place.clone(),
            LocationWeather {
                temperature: temp.value,
                humidity,
                wind_speed,
                wind_direction,
                dew_point: dew,
                temperature_dew_point_diff: temp.value - dew,
                has_inversion_layer: has_inversion,
                inversion_layer_height: estimate_inversion_height(visibility_m, humidity),
                observation_height: config.station_elevation(&place),
                update_time: update_time.clone(),
                fog_alert,
                provenance: DataProvenance {
                    temperature: FieldSource::Observed,
                    humidity: if humidity_reading.is_some() {
                        FieldSource::Observed
                    } else {
                        FieldSource::Default
                    },
                    wind: wind_source,
                },
                place,
            },
        );
    }

    debug!(stations = map.len(), "Assembled Observatory weather map");
    Ok(map)
}

/// Estimated inversion layer height in meters. Poor visibility with very
/// humid air puts the layer low; otherwise it sits well above the peaks.
#[must_use]
pub fn estimate_inversion_height(visibility_m: f64, humidity: f64) -> f64 {
    if visibility_m < INVERSION_VISIBILITY_M && humidity > 95.0 {
        300.0
    } else if visibility_m < 2000.0 && humidity > 90.0 {
        600.0
    } else {
        1000.0
    }
}

/// Parse a wind direction string from the feed. The Chinese-language
/// payload publishes compass names; octant abbreviations are accepted too.
#[must_use]
pub fn parse_direction(raw: &str) -> Option<WindDirection> {
    let trimmed = raw.trim();
    match trimmed {
        "北" => Some(WindDirection::N),
        "東北" => Some(WindDirection::NE),
        "東" => Some(WindDirection::E),
        "東南" => Some(WindDirection::SE),
        "南" => Some(WindDirection::S),
        "西南" => Some(WindDirection::SW),
        "西" => Some(WindDirection::W),
        "西北" => Some(WindDirection::NW),
        other => other.parse().ok(),
    }
}

/// Format an RFC 3339 report time as Hong Kong local `yyyy-MM-dd HH:mm`.
/// Unparseable input is passed through untouched.
#[must_use]
pub fn format_hong_kong_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(&Hong_Kong)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(e) => {
            warn!("Unparseable Observatory update time {raw:?}: {e}");
            raw.to_string()
        }
    }
}
