use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::time::hhmm;

/// Lifecycle of a scheduled duty.
///
/// Moves forward `Scheduled → At Risk → Critical → Departed → Completed`, or
/// to `Cancelled`. Only an operator correction (such as a vehicle swap)
/// moves a duty back to `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DutyStatus {
    Scheduled,
    #[serde(rename = "At Risk")]
    AtRisk,
    Critical,
    Departed,
    Completed,
    Cancelled,
}

impl DutyStatus {
    /// Returns `true` once the duty has left the depot or will never run.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            DutyStatus::Departed | DutyStatus::Completed | DutyStatus::Cancelled
        )
    }
}

/// A scheduled vehicle assignment (block) leaving a depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledDuty {
    pub id: String,
    pub depot_id: String,
    pub vehicle_id: String,
    #[serde(with = "hhmm")]
    pub departure_time: NaiveTime,
    #[serde(with = "hhmm", default = "midnight")]
    pub return_time: NaiveTime,
    #[serde(default)]
    pub route_id: String,
    #[serde(default)]
    pub route_name: String,
    #[serde(default)]
    pub distance_km: f32,
    #[serde(default)]
    pub driver: String,
    /// SoC the vehicle needs at pull-out (%).
    pub required_soc: f32,
    #[serde(default = "scheduled")]
    pub status: DutyStatus,
}

fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

fn scheduled() -> DutyStatus {
    DutyStatus::Scheduled
}

impl ScheduledDuty {
    /// Creates a scheduled duty with no route or crew details.
    pub fn new(
        id: impl Into<String>,
        depot_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        departure_time: NaiveTime,
        required_soc: f32,
    ) -> Self {
        Self {
            id: id.into(),
            depot_id: depot_id.into(),
            vehicle_id: vehicle_id.into(),
            departure_time,
            return_time: midnight(),
            route_id: String::new(),
            route_name: String::new(),
            distance_km: 0.0,
            driver: String::new(),
            required_soc,
            status: DutyStatus::Scheduled,
        }
    }

    /// Human-readable service name for alert text.
    pub fn service_name(&self) -> &str {
        if self.route_name.is_empty() {
            &self.id
        } else {
            &self.route_name
        }
    }
}
