//! Weather observation model consumed by the cloud sea predictor

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CloudSeaError;

/// Compass octant for surface wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl WindDirection {
    /// All octants in clockwise order starting at north
    pub const ALL: [WindDirection; 8] = [
        WindDirection::N,
        WindDirection::NE,
        WindDirection::E,
        WindDirection::SE,
        WindDirection::S,
        WindDirection::SW,
        WindDirection::W,
        WindDirection::NW,
    ];

    /// Convert meteorological degrees (0-360, 0 = north) to the nearest octant
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let index = ((normalized / 45.0).round() as usize) % 8;
        Self::ALL[index]
    }

    /// Onshore easterly flow (E, SE, NE) favours cloud sea formation over
    /// the New Territories peaks
    #[must_use]
    pub fn is_easterly(self) -> bool {
        matches!(self, WindDirection::E | WindDirection::SE | WindDirection::NE)
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindDirection::N => "N",
            WindDirection::NE => "NE",
            WindDirection::E => "E",
            WindDirection::SE => "SE",
            WindDirection::S => "S",
            WindDirection::SW => "SW",
            WindDirection::W => "W",
            WindDirection::NW => "NW",
        };
        write!(f, "{s}")
    }
}

impl FromStr for WindDirection {
    type Err = CloudSeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(WindDirection::N),
            "NE" => Ok(WindDirection::NE),
            "E" => Ok(WindDirection::E),
            "SE" => Ok(WindDirection::SE),
            "S" => Ok(WindDirection::S),
            "SW" => Ok(WindDirection::SW),
            "W" => Ok(WindDirection::W),
            "NW" => Ok(WindDirection::NW),
            other => Err(CloudSeaError::validation(format!(
                "Unknown wind direction: {other}"
            ))),
        }
    }
}

/// A single surface observation at a candidate viewing site.
///
/// Constructed fresh for every prediction, either from form input or from
/// an upstream weather payload. The predictor treats it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Relative humidity in percent (0-100)
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction as compass octant
    pub wind_direction: WindDirection,
    /// Spread between air temperature and dew point in °C
    pub temperature_dew_point_diff: f64,
    /// Whether a temperature inversion is present aloft
    pub has_inversion_layer: bool,
    /// Height of the inversion layer in meters above sea level
    pub inversion_layer_height: f64,
    /// Height of the candidate viewing site in meters above sea level
    pub observation_height: f64,
}

impl Observation {
    /// Check field ranges before handing the observation to the predictor.
    ///
    /// The predictor itself performs no validation (it scores whatever it
    /// is given), so callers accepting untrusted input should validate at
    /// construction time.
    pub fn validate(&self) -> Result<(), CloudSeaError> {
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(CloudSeaError::validation(format!(
                "Humidity must be between 0 and 100, got {}",
                self.humidity
            )));
        }
        if self.wind_speed < 0.0 {
            return Err(CloudSeaError::validation(format!(
                "Wind speed cannot be negative, got {}",
                self.wind_speed
            )));
        }
        if self.temperature_dew_point_diff < 0.0 {
            return Err(CloudSeaError::validation(format!(
                "Dew-point spread cannot be negative, got {}",
                self.temperature_dew_point_diff
            )));
        }
        if self.inversion_layer_height < 0.0 || self.observation_height < 0.0 {
            return Err(CloudSeaError::validation(
                "Heights cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
