//! Prediction output model

use serde::{Deserialize, Serialize};

/// Per-criterion pass/fail breakdown. Always exactly six entries,
/// regardless of input validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    /// Relative humidity at or above 95%
    pub humidity: bool,
    /// Wind speed at or below 19 km/h
    pub wind_speed: bool,
    /// Wind from E, SE or NE
    pub wind_direction: bool,
    /// Dew-point spread at or below 6°C
    pub temperature_dew_point: bool,
    /// Temperature inversion present aloft
    pub inversion_layer: bool,
    /// Viewing site strictly above the inversion layer
    pub height_advantage: bool,
}

impl Conditions {
    /// Number of satisfied criteria (0-6)
    #[must_use]
    pub fn satisfied_count(&self) -> usize {
        [
            self.humidity,
            self.wind_speed,
            self.wind_direction,
            self.temperature_dew_point,
            self.inversion_layer,
            self.height_advantage,
        ]
        .iter()
        .filter(|&&met| met)
        .count()
    }

    /// Total number of criteria evaluated
    #[must_use]
    pub fn total_count(&self) -> usize {
        6
    }

    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.satisfied_count() == self.total_count()
    }
}

/// Result of one cloud sea prediction. Derived entirely from a single
/// [`Observation`](crate::models::Observation); never cached or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// True when probability reaches 60
    pub has_cloud_sea: bool,
    /// Composite score, clamped to [0, 100] and rounded to an integer
    pub probability: u8,
    /// Per-criterion breakdown
    pub conditions: Conditions,
    /// Human-readable advisory, including the missing-condition list
    /// when not all criteria are satisfied
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfied_count() {
        let conditions = Conditions {
            humidity: true,
            wind_speed: true,
            wind_direction: false,
            temperature_dew_point: true,
            inversion_layer: false,
            height_advantage: true,
        };
        assert_eq!(conditions.satisfied_count(), 4);
        assert_eq!(conditions.total_count(), 6);
        assert!(!conditions.all_satisfied());
    }
}
