//! End-to-end prediction flow against canned Observatory payloads

use cloudsea::config::ObservationConfig;
use cloudsea::error::CloudSeaError;
use cloudsea::models::WindDirection;
use cloudsea::predict_from_map;
use cloudsea::weather::hko::{
    CurrentWeatherResponse, VisibilityResponse, build_weather_map, extract_visibility,
};

/// A winter-morning report: fog over the harbour, saturated air on the
/// summits, light easterly flow.
const CLOUD_SEA_MORNING: &str = r#"{
    "temperature": {"data": [
        {"place": "大帽山", "value": 11.5},
        {"place": "山頂", "value": 14.0},
        {"place": "荃灣", "value": 17.0}
    ]},
    "humidity": {"data": [
        {"place": "大帽山", "value": 99.0},
        {"place": "山頂", "value": 96.0},
        {"place": "荃灣", "value": 90.0}
    ]},
    "wind": {"data": [
        {"place": "大帽山", "value": 9.0, "direction": "東"},
        {"place": "山頂", "value": 14.0, "direction": "東南"}
    ]},
    "updateTime": "2024-01-20T06:30:00+08:00"
}"#;

const VISIBILITY_FOG: &str = r#"{"data": [{"value": 700.0}]}"#;

fn weather_map() -> std::collections::HashMap<String, cloudsea::LocationWeather> {
    let current: CurrentWeatherResponse = serde_json::from_str(CLOUD_SEA_MORNING).unwrap();
    let visibility: VisibilityResponse = serde_json::from_str(VISIBILITY_FOG).unwrap();
    build_weather_map(
        &current,
        extract_visibility(&visibility),
        true,
        &ObservationConfig::default(),
    )
    .unwrap()
}

#[test]
fn summit_above_the_inversion_gets_a_confident_call() {
    let result = predict_from_map(&weather_map(), "大帽山").unwrap();

    // 700 m visibility with 99% humidity puts the layer at 300 m, well
    // below the 957 m summit; all six criteria hold
    assert!(result.prediction.conditions.all_satisfied());
    assert_eq!(result.prediction.probability, 100);
    assert!(result.prediction.has_cloud_sea);
    assert!(
        result
            .prediction
            .recommendation
            .contains("source: Hong Kong Observatory, updated 2024-01-20 06:30")
    );
    assert_eq!(result.weather.wind_direction, WindDirection::E);
}

#[test]
fn lowland_station_misses_the_height_advantage() {
    let result = predict_from_map(&weather_map(), "荃灣").unwrap();

    let conditions = result.prediction.conditions;
    assert!(!conditions.height_advantage, "30 m is inside the fog layer");
    assert!(!conditions.humidity, "90% is below the 95% criterion");
    assert!(
        result
            .prediction
            .recommendation
            .contains("viewpoint not above the inversion layer")
    );
}

#[test]
fn english_site_names_resolve_to_observatory_stations() {
    let by_id = predict_from_map(&weather_map(), "victoria-peak").unwrap();
    let by_zh = predict_from_map(&weather_map(), "山頂").unwrap();
    assert_eq!(by_id.prediction, by_zh.prediction);
}

#[test]
fn station_missing_from_the_report_is_surfaced_not_defaulted() {
    let err = predict_from_map(&weather_map(), "鳳凰山").unwrap_err();
    assert!(matches!(
        err,
        CloudSeaError::DataUnavailable { ref location } if location == "鳳凰山"
    ));
    assert!(err.user_message().contains("temporarily unavailable"));
}

#[test]
fn defaults_cover_routine_gaps_but_predictions_still_run() {
    // 荃灣 has no wind reading; the configured SE/15 km/h defaults apply
    let config = ObservationConfig::default();
    let result = predict_from_map(&weather_map(), "Tsuen Wan").unwrap();
    assert_eq!(result.weather.wind_speed, config.default_wind_speed);
    assert_eq!(result.weather.wind_direction, config.default_wind_direction);
}
