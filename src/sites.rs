//! Registry of elevated cloud sea viewing sites
//!
//! The well-known Hong Kong viewpoints the dashboard predicts for, with
//! the coordinates and elevations used for observation-height lookups and
//! nearest-site search.

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// An elevated viewpoint (or reference station) with a known elevation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingSite {
    /// Stable identifier used in API paths (kebab-case)
    pub id: String,
    /// English name
    pub name: String,
    /// Name as published by the Observatory
    pub name_zh: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Elevation in meters above sea level
    pub elevation: f64,
}

impl ViewingSite {
    fn new(id: &str, name: &str, name_zh: &str, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_zh: name_zh.to_string(),
            latitude,
            longitude,
            elevation,
        }
    }

    /// Distance from a coordinate in kilometers
    #[must_use]
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        let from = HaversineLocation {
            latitude,
            longitude,
        };
        let to = HaversineLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        distance(from, to, Units::Kilometers)
    }
}

/// All registered viewing sites. Tsuen Wan is a lowland reference
/// station, kept because the Observatory publishes readings for it that
/// anchor the district weather table.
#[must_use]
pub fn viewing_sites() -> Vec<ViewingSite> {
    vec![
        ViewingSite::new("tai-mo-shan", "Tai Mo Shan", "大帽山", 22.411811, 114.123144, 957.0),
        ViewingSite::new("tates-cairn", "Tate's Cairn", "大老山", 22.3579, 114.2178, 577.0),
        ViewingSite::new("sunset-peak", "Sunset Peak", "大東山", 22.2686, 113.9498, 869.0),
        ViewingSite::new("lantau-peak", "Lantau Peak", "鳳凰山", 22.2502, 113.9128, 934.0),
        ViewingSite::new("victoria-peak", "Victoria Peak", "山頂", 22.2708, 114.1497, 552.0),
        ViewingSite::new("tsuen-wan", "Tsuen Wan", "荃灣", 22.3714, 114.1144, 30.0),
    ]
}

/// Look a site up by id, English name or Observatory name
#[must_use]
pub fn find_site(key: &str) -> Option<ViewingSite> {
    let key_lower = key.trim().to_lowercase();
    viewing_sites().into_iter().find(|site| {
        site.id == key_lower || site.name.to_lowercase() == key_lower || site.name_zh == key.trim()
    })
}

/// Closest registered site to a coordinate, with its distance in km
#[must_use]
pub fn nearest_site(latitude: f64, longitude: f64) -> Option<(ViewingSite, f64)> {
    viewing_sites()
        .into_iter()
        .map(|site| {
            let d = site.distance_km(latitude, longitude);
            (site, d)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
