//! Error types and handling for the CloudSea service

use thiserror::Error;

/// Main error type for the CloudSea service
#[derive(Error, Debug)]
pub enum CloudSeaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// All observation data for a requested location is missing upstream.
    /// Distinct from routine missing fields, which fall back to defaults:
    /// this one must surface to the caller instead.
    #[error("Weather data for {location} is temporarily unavailable")]
    DataUnavailable { location: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl CloudSeaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new data-unavailable error for a named location
    pub fn data_unavailable<S: Into<String>>(location: S) -> Self {
        Self::DataUnavailable {
            location: location.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CloudSeaError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            CloudSeaError::Api { .. } => {
                "Unable to reach the weather services. Please check your internet connection."
                    .to_string()
            }
            CloudSeaError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            CloudSeaError::DataUnavailable { location } => {
                format!("{location} data is temporarily unavailable. Try again later.")
            }
            CloudSeaError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            CloudSeaError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            CloudSeaError::General { message } => message.clone(),
        }
    }
}
