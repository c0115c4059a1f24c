//! Cloud sea prediction heuristic
//!
//! A deterministic multi-factor score over a single surface observation.
//! Six boolean criteria contribute an even share of the base score, a few
//! strongly correlated combinations add a bonus on top, and the result is
//! clamped to [0, 100]. No I/O, no randomness: identical observations
//! always yield identical predictions.

use crate::models::{Conditions, Observation, Prediction};

/// Relative humidity must reach this level for near-saturated air
pub const HUMIDITY_THRESHOLD: f64 = 95.0;
/// Stronger winds mix the boundary layer and break the fog deck up
pub const WIND_SPEED_LIMIT_KMH: f64 = 19.0;
/// Maximum dew-point spread for condensation to be plausible
pub const DEW_POINT_SPREAD_LIMIT_C: f64 = 6.0;

/// Probability at or above which a cloud sea is called
const CLOUD_SEA_THRESHOLD: f64 = 60.0;
/// Lower bound of the "worth a gamble" tier
const MODERATE_THRESHOLD: f64 = 40.0;

/// Evaluate the six criteria against an observation.
///
/// Exposed separately so the breakdown can be rendered (or tested)
/// without running the full scoring pipeline.
#[must_use]
pub fn evaluate_conditions(observation: &Observation) -> Conditions {
    Conditions {
        humidity: observation.humidity >= HUMIDITY_THRESHOLD,
        wind_speed: observation.wind_speed <= WIND_SPEED_LIMIT_KMH,
        wind_direction: observation.wind_direction.is_easterly(),
        temperature_dew_point: observation.temperature_dew_point_diff <= DEW_POINT_SPREAD_LIMIT_C,
        inversion_layer: observation.has_inversion_layer,
        // Strict: a viewpoint level with the inversion top is still inside the fog
        height_advantage: observation.observation_height > observation.inversion_layer_height,
    }
}

/// Score an observation and produce the full prediction record.
#[must_use]
pub fn predict(observation: &Observation) -> Prediction {
    let conditions = evaluate_conditions(observation);

    let satisfied = conditions.satisfied_count() as f64;
    let total = conditions.total_count() as f64;
    let mut probability = satisfied / total * 100.0;

    // Bonuses stack; each pairs a passing criterion with a stronger signal
    if conditions.humidity && conditions.inversion_layer {
        probability += 15.0;
    }
    if conditions.temperature_dew_point && observation.temperature_dew_point_diff <= 2.0 {
        probability += 10.0;
    }
    if conditions.wind_speed && observation.wind_speed <= 10.0 {
        probability += 5.0;
    }

    // Clamp first, classify on the fractional value, round only for output.
    // Rounding before the threshold comparison would misclassify scores
    // like 59.6.
    probability = probability.clamp(0.0, 100.0);
    let has_cloud_sea = probability >= CLOUD_SEA_THRESHOLD;

    let mut recommendation = if has_cloud_sea {
        "High chance of a cloud sea. Head for an elevated viewpoint.".to_string()
    } else if probability >= MODERATE_THRESHOLD {
        "Moderate chance of a cloud sea. Going up is a gamble.".to_string()
    } else {
        "Low chance of a cloud sea. Wait for better conditions.".to_string()
    };

    let missing = missing_conditions(&conditions);
    if !missing.is_empty() {
        recommendation.push_str(" Missing conditions: ");
        recommendation.push_str(&missing.join(", "));
        recommendation.push('.');
    }

    Prediction {
        has_cloud_sea,
        probability: probability.round() as u8,
        conditions,
        recommendation,
    }
}

/// One fixed reason per failed criterion, in criterion order.
#[must_use]
pub fn missing_conditions(conditions: &Conditions) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !conditions.humidity {
        missing.push("humidity below 95%");
    }
    if !conditions.wind_speed {
        missing.push("wind too strong");
    }
    if !conditions.wind_direction {
        missing.push("unfavourable wind direction");
    }
    if !conditions.temperature_dew_point {
        missing.push("dew-point spread too large");
    }
    if !conditions.inversion_layer {
        missing.push("no inversion layer");
    }
    if !conditions.height_advantage {
        missing.push("viewpoint not above the inversion layer");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindDirection;
    use rstest::rstest;

    fn ideal_observation() -> Observation {
        Observation {
            humidity: 98.0,
            wind_speed: 8.0,
            wind_direction: WindDirection::E,
            temperature_dew_point_diff: 1.0,
            has_inversion_layer: true,
            inversion_layer_height: 500.0,
            observation_height: 957.0,
        }
    }

    fn hopeless_observation() -> Observation {
        Observation {
            humidity: 50.0,
            wind_speed: 40.0,
            wind_direction: WindDirection::N,
            temperature_dew_point_diff: 15.0,
            has_inversion_layer: false,
            inversion_layer_height: 0.0,
            observation_height: 0.0,
        }
    }

    #[test]
    fn test_all_criteria_failing_scores_zero() {
        let prediction = predict(&hopeless_observation());
        assert_eq!(prediction.probability, 0);
        assert!(!prediction.has_cloud_sea);
        assert_eq!(prediction.conditions.satisfied_count(), 0);
    }

    #[test]
    fn test_all_criteria_failing_lists_every_reason() {
        let prediction = predict(&hopeless_observation());
        for reason in [
            "humidity below 95%",
            "wind too strong",
            "unfavourable wind direction",
            "dew-point spread too large",
            "no inversion layer",
            "viewpoint not above the inversion layer",
        ] {
            assert!(
                prediction.recommendation.contains(reason),
                "missing reason {reason:?} in {:?}",
                prediction.recommendation
            );
        }
    }

    #[test]
    fn test_ideal_conditions_clamp_to_hundred() {
        // 100 base + 15 + 10 + 5 raw, clamped
        let prediction = predict(&ideal_observation());
        assert_eq!(prediction.probability, 100);
        assert!(prediction.has_cloud_sea);
        assert!(prediction.conditions.all_satisfied());
        assert!(!prediction.recommendation.contains("Missing conditions"));
    }

    #[test]
    fn test_documented_scenario() {
        // 5 of 6 criteria met, only the dew-point bonus applies:
        // 83.33 + 10 = 93.33, rounds to 93
        let obs = Observation {
            humidity: 98.0,
            wind_speed: 15.0,
            wind_direction: WindDirection::SE,
            temperature_dew_point_diff: 2.0,
            has_inversion_layer: false,
            inversion_layer_height: 560.0,
            observation_height: 800.0,
        };
        let prediction = predict(&obs);
        assert_eq!(prediction.probability, 93);
        assert!(prediction.has_cloud_sea);
        assert!(!prediction.conditions.inversion_layer);
        assert!(prediction.conditions.height_advantage);
        assert!(prediction.recommendation.contains("no inversion layer"));
        assert!(!prediction.recommendation.contains("wind too strong"));
    }

    #[rstest]
    #[case(95.0, true)]
    #[case(94.999, false)]
    fn test_humidity_boundary(#[case] humidity: f64, #[case] expected: bool) {
        let obs = Observation {
            humidity,
            ..ideal_observation()
        };
        assert_eq!(evaluate_conditions(&obs).humidity, expected);
    }

    #[rstest]
    #[case(19.0, true)]
    #[case(19.001, false)]
    fn test_wind_speed_boundary(#[case] wind_speed: f64, #[case] expected: bool) {
        let obs = Observation {
            wind_speed,
            ..ideal_observation()
        };
        assert_eq!(evaluate_conditions(&obs).wind_speed, expected);
    }

    #[test]
    fn test_height_advantage_requires_strict_inequality() {
        let obs = Observation {
            inversion_layer_height: 800.0,
            observation_height: 800.0,
            ..ideal_observation()
        };
        assert!(!evaluate_conditions(&obs).height_advantage);
    }

    #[rstest]
    #[case(WindDirection::E, true)]
    #[case(WindDirection::SE, true)]
    #[case(WindDirection::NE, true)]
    #[case(WindDirection::N, false)]
    #[case(WindDirection::S, false)]
    #[case(WindDirection::SW, false)]
    #[case(WindDirection::W, false)]
    #[case(WindDirection::NW, false)]
    fn test_wind_direction_criterion(#[case] direction: WindDirection, #[case] expected: bool) {
        let obs = Observation {
            wind_direction: direction,
            ..ideal_observation()
        };
        assert_eq!(evaluate_conditions(&obs).wind_direction, expected);
    }

    #[test]
    fn test_bonuses_are_independent() {
        // Humidity + inversion bonus only: 100 base is already reached by
        // all six, so disable wind and dew point extremes instead
        let obs = Observation {
            wind_speed: 15.0,                 // passes, no <=10 bonus
            temperature_dew_point_diff: 5.0,  // passes, no <=2 bonus
            ..ideal_observation()
        };
        // 6/6 = 100 + 15, clamped to 100
        let prediction = predict(&obs);
        assert_eq!(prediction.probability, 100);

        // Drop humidity below threshold: 5/6 = 83.33, no bonuses at all
        let obs = Observation {
            humidity: 90.0,
            ..obs
        };
        assert_eq!(predict(&obs).probability, 83);
    }

    #[test]
    fn test_prediction_is_pure() {
        let obs = ideal_observation();
        assert_eq!(predict(&obs), predict(&obs));
    }

    #[test]
    fn test_probability_always_within_bounds() {
        // Exhaustive over the criterion/bonus trigger space
        for humidity in [50.0, 95.0, 98.0] {
            for wind_speed in [5.0, 15.0, 30.0] {
                for direction in WindDirection::ALL {
                    for spread in [1.0, 4.0, 10.0] {
                        for inversion in [false, true] {
                            let obs = Observation {
                                humidity,
                                wind_speed,
                                wind_direction: direction,
                                temperature_dew_point_diff: spread,
                                has_inversion_layer: inversion,
                                inversion_layer_height: 560.0,
                                observation_height: 800.0,
                            };
                            let prediction = predict(&obs);
                            assert!(prediction.probability <= 100);
                            if prediction.has_cloud_sea {
                                assert!(prediction.probability >= 60);
                            }
                        }
                    }
                }
            }
        }
    }
}
