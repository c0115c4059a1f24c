//! `CloudSea` - Hong Kong cloud sea prediction and weather service
//!
//! This library provides the cloud sea prediction heuristic together with
//! the observation adapters that feed it: Hong Kong Observatory open data
//! for per-station predictions and Open-Meteo for form autofill.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod predictor;
pub mod service;
pub mod sites;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use service::{CloudSeaService, LocationPrediction, predict_from_map};
pub use config::CloudSeaConfig;
pub use error::CloudSeaError;
pub use models::{Conditions, Observation, Prediction, WindDirection};
pub use predictor::predict;
pub use sites::{ViewingSite, find_site, nearest_site, viewing_sites};
pub use weather::{HkoClient, LocationWeather, OpenMeteoClient};
