//! Configuration management for the CloudSea service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::CloudSeaError;
use crate::models::WindDirection;

/// Root configuration structure for the CloudSea service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSeaConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream weather API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Observation defaults and the station elevation table
    #[serde(default)]
    pub observation: ObservationConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the API server on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Upstream weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL for Hong Kong Observatory open data
    #[serde(default = "default_hko_base_url")]
    pub hko_base_url: String,
    /// Base URL for the Open-Meteo forecast API
    #[serde(default = "default_open_meteo_base_url")]
    pub open_meteo_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_upstream_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Weather map TTL in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Defaults substituted for routine missing observation fields, plus the
/// per-station elevation table. Kept in configuration so the predictor
/// itself stays free of location knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationConfig {
    /// Location predicted when none is requested
    #[serde(default = "default_location")]
    pub default_location: String,
    /// Fallback wind speed in km/h when a station reports no wind
    #[serde(default = "default_wind_speed")]
    pub default_wind_speed: f64,
    /// Fallback wind direction when a station reports no wind
    #[serde(default = "default_wind_direction")]
    pub default_wind_direction: WindDirection,
    /// Fallback relative humidity in percent
    #[serde(default = "default_humidity")]
    pub default_humidity: f64,
    /// Station elevations in meters above sea level, keyed by the place
    /// name the Observatory publishes
    #[serde(default = "default_station_elevations")]
    pub station_elevations: HashMap<String, f64>,
    /// Elevation assumed for stations absent from the table
    #[serde(default = "default_fallback_elevation")]
    pub fallback_elevation: f64,
}

// Default value functions
fn default_server_port() -> u16 {
    8080
}

fn default_hko_base_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata".to_string()
}

fn default_open_meteo_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_upstream_timeout() -> u32 {
    30
}

fn default_upstream_max_retries() -> u32 {
    3
}

fn default_cache_ttl() -> u32 {
    10
}

fn default_cache_location() -> String {
    "~/.cache/cloudsea".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_location() -> String {
    "大帽山".to_string()
}

fn default_wind_speed() -> f64 {
    15.0
}

fn default_wind_direction() -> WindDirection {
    WindDirection::SE
}

fn default_humidity() -> f64 {
    80.0
}

fn default_station_elevations() -> HashMap<String, f64> {
    HashMap::from([
        ("荃灣".to_string(), 30.0),
        ("大帽山".to_string(), 957.0),
        ("大老山".to_string(), 577.0),
        ("大東山".to_string(), 869.0),
        ("鳳凰山".to_string(), 934.0),
        ("山頂".to_string(), 552.0),
    ])
}

fn default_fallback_elevation() -> f64 {
    30.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            hko_base_url: default_hko_base_url(),
            open_meteo_base_url: default_open_meteo_base_url(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_upstream_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            default_wind_speed: default_wind_speed(),
            default_wind_direction: default_wind_direction(),
            default_humidity: default_humidity(),
            station_elevations: default_station_elevations(),
            fallback_elevation: default_fallback_elevation(),
        }
    }
}

impl ObservationConfig {
    /// Elevation of a named station, falling back to the configured default
    #[must_use]
    pub fn station_elevation(&self, place: &str) -> f64 {
        self.station_elevations
            .get(place)
            .copied()
            .unwrap_or(self.fallback_elevation)
    }
}

impl Default for CloudSeaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            observation: ObservationConfig::default(),
        }
    }
}

impl CloudSeaConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with CLOUDSEA_ prefix,
        // e.g. CLOUDSEA_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("CLOUDSEA")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: CloudSeaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.upstream.hko_base_url.is_empty() {
            return Err(CloudSeaError::config("HKO base URL cannot be empty").into());
        }
        if self.upstream.open_meteo_base_url.is_empty() {
            return Err(CloudSeaError::config("Open-Meteo base URL cannot be empty").into());
        }
        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(CloudSeaError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            )
            .into());
        }
        if !(0.0..=100.0).contains(&self.observation.default_humidity) {
            return Err(
                CloudSeaError::config("Default humidity must be between 0 and 100").into(),
            );
        }
        if self.observation.default_wind_speed < 0.0 {
            return Err(CloudSeaError::config("Default wind speed cannot be negative").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CloudSeaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.observation.default_wind_speed, 15.0);
        assert_eq!(
            config.observation.default_wind_direction,
            WindDirection::SE
        );
    }

    #[test]
    fn test_station_elevation_lookup() {
        let observation = ObservationConfig::default();
        assert_eq!(observation.station_elevation("大帽山"), 957.0);
        assert_eq!(observation.station_elevation("山頂"), 552.0);
        // Unknown stations fall back to lowland elevation
        assert_eq!(observation.station_elevation("將軍澳"), 30.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CloudSeaConfig::default();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = CloudSeaConfig::default();
        config.observation.default_humidity = 150.0;
        assert!(config.validate().is_err());
    }
}
