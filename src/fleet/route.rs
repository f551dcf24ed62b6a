//! Service routes as waypoint polylines.

use serde::{Deserialize, Serialize};

/// A service route. The simulation drives it as a closed loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub depot_id: String,
    /// `[lat, lng]` pairs in driving order.
    #[serde(default)]
    pub waypoints: Vec<[f64; 2]>,
    #[serde(default)]
    pub distance_km: f32,
}

impl Route {
    /// Returns `true` if `key` names this route by id or display name.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name == key
    }

    /// Interpolated `(lat, lng)` at lap `progress` in `[0, 1)`.
    ///
    /// Returns `None` when the route has fewer than two waypoints.
    pub fn position_at(&self, progress: f32) -> Option<(f64, f64)> {
        if self.waypoints.len() < 2 {
            return None;
        }

        let segments = self.waypoints.len() - 1;
        let scaled = f64::from(progress.clamp(0.0, 1.0)) * segments as f64;
        let index = (scaled.floor() as usize).min(segments);
        let fraction = scaled - index as f64;
        let next = (index + 1).min(segments);

        let [lat1, lng1] = self.waypoints[index];
        let [lat2, lng2] = self.waypoints[next];
        Some((
            lat1 + (lat2 - lat1) * fraction,
            lng1 + (lng2 - lng1) * fraction,
        ))
    }
}
