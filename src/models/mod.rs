//! Data models for the CloudSea service
//!
//! This module contains the core domain models organized by concern:
//! - Observation: A surface weather observation at a viewing site
//! - Prediction: The cloud sea prediction derived from one observation

pub mod observation;
pub mod prediction;

// Re-export all public types for convenient access
pub use observation::{Observation, WindDirection};
pub use prediction::{Conditions, Prediction};
