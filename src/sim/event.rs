//! Scenario timeline events.
//!
//! Events are how external changes reach the fleet: charger faults, vehicles
//! going out of service, duties departing. Each event fires at most once, on
//! the tick whose interval contains its time of day.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fleet::time::{hhmm, minute_of_day};
use crate::fleet::{ChargerStatus, DutyStatus, VehicleStatus};

use super::links;
use super::state::FleetState;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// What happens when an event fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventEffect {
    /// Charger goes into fault; the connected vehicle stays plugged in.
    ChargerFault {
        charger_id: String,
        fault_code: String,
    },
    /// Faulted or offline charger comes back.
    ChargerRestored { charger_id: String },
    VehicleStatus {
        vehicle_id: String,
        status: VehicleStatus,
    },
    VehicleSoc { vehicle_id: String, soc: f32 },
    DutyStatus {
        duty_id: String,
        status: DutyStatus,
    },
    PlugIn {
        vehicle_id: String,
        charger_id: String,
    },
    Unplug { vehicle_id: String },
}

/// A timed scenario event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioEvent {
    /// Time of day the event fires.
    #[serde(with = "hhmm")]
    pub at: NaiveTime,
    #[serde(default)]
    pub title: String,
    pub effect: EventEffect,
    #[serde(skip)]
    pub fired: bool,
}

impl ScenarioEvent {
    pub fn new(at: NaiveTime, title: impl Into<String>, effect: EventEffect) -> Self {
        Self {
            at,
            title: title.into(),
            effect,
            fired: false,
        }
    }

    /// Returns `true` when `at` falls in the interval `(previous, now]`.
    ///
    /// Only the time of day is compared, so intervals crossing midnight wrap
    /// and an interval of a full day or more contains every time.
    pub fn due_between(&self, previous: NaiveDateTime, now: NaiveDateTime) -> bool {
        let elapsed = (now - previous).num_minutes();
        if elapsed <= 0 {
            return false;
        }
        if elapsed >= MINUTES_PER_DAY {
            return true;
        }

        let at = minute_of_day(&self.at);
        let from = minute_of_day(&previous);
        let to = minute_of_day(&now);
        if from < to {
            from < at && at <= to
        } else {
            at > from || at <= to
        }
    }
}

/// Applies every unfired event due in `(previous, now]`, in timeline order.
///
/// Returns the number of events fired. Events naming unknown entities are
/// marked fired and skipped with a warning.
pub fn apply_due_events(state: &mut FleetState, previous: NaiveDateTime, now: NaiveDateTime) -> usize {
    let due: Vec<usize> = state
        .events
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.fired && e.due_between(previous, now))
        .map(|(i, _)| i)
        .collect();

    for &i in &due {
        state.events[i].fired = true;
        let event = state.events[i].clone();
        if apply_effect(state, &event.effect) {
            info!(at = %event.at.format("%H:%M"), title = %event.title, "scenario event applied");
        } else {
            warn!(at = %event.at.format("%H:%M"), effect = ?event.effect, "scenario event target not found");
        }
    }
    due.len()
}

fn apply_effect(state: &mut FleetState, effect: &EventEffect) -> bool {
    match effect {
        EventEffect::ChargerFault {
            charger_id,
            fault_code,
        } => {
            let Some(charger) = state.charger_mut(charger_id) else {
                return false;
            };
            charger.status = ChargerStatus::Faulted;
            charger.fault_code = Some(fault_code.clone());
            charger.clear_readings();
            true
        }
        EventEffect::ChargerRestored { charger_id } => {
            let Some(charger) = state.charger_mut(charger_id) else {
                return false;
            };
            charger.fault_code = None;
            charger.status = if charger.connected_vehicle.is_some() {
                ChargerStatus::Active
            } else {
                ChargerStatus::Available
            };
            true
        }
        EventEffect::VehicleStatus { vehicle_id, status } => {
            let Some(vehicle) = state.vehicle_mut(vehicle_id) else {
                return false;
            };
            vehicle.status = *status;
            true
        }
        EventEffect::VehicleSoc { vehicle_id, soc } => {
            let Some(vehicle) = state.vehicle_mut(vehicle_id) else {
                return false;
            };
            vehicle.soc = soc.clamp(0.0, 100.0);
            true
        }
        EventEffect::DutyStatus { duty_id, status } => {
            let Some(duty) = state.duty_mut(duty_id) else {
                return false;
            };
            duty.status = *status;
            true
        }
        EventEffect::PlugIn {
            vehicle_id,
            charger_id,
        } => links::connect_charger(state, vehicle_id, charger_id),
        EventEffect::Unplug { vehicle_id } => {
            if state.vehicle(vehicle_id).is_none() {
                return false;
            }
            links::disconnect_charger(state, vehicle_id);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Charger, Vehicle};
    use crate::sim::clock::SimClock;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid timestamp")
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn fault(h: u32, m: u32) -> ScenarioEvent {
        ScenarioEvent::new(
            hm(h, m),
            "CH-1 trips",
            EventEffect::ChargerFault {
                charger_id: "CH-1".to_string(),
                fault_code: "over-temperature".to_string(),
            },
        )
    }

    #[test]
    fn interval_is_open_closed() {
        let e = fault(4, 0);
        assert!(!e.due_between(at(4, 0), at(4, 4)));
        assert!(e.due_between(at(3, 56), at(4, 0)));
        assert!(e.due_between(at(3, 59), at(4, 3)));
        assert!(!e.due_between(at(4, 0), at(4, 0)));
    }

    #[test]
    fn interval_wraps_midnight() {
        let late = fault(23, 59);
        let early = fault(0, 1);
        let prev = at(23, 58);
        let now = prev + chrono::Duration::minutes(4);
        assert!(late.due_between(prev, now));
        assert!(early.due_between(prev, now));
        assert!(!fault(12, 0).due_between(prev, now));
    }

    #[test]
    fn fires_once() {
        let mut s = FleetState::new(SimClock::new(at(3, 59), 1));
        s.chargers = vec![Charger::new("CH-1", "central", 50.0, ChargerStatus::Active)];
        s.events = vec![fault(4, 0)];

        assert_eq!(apply_due_events(&mut s, at(3, 59), at(4, 0)), 1);
        let c = s.charger("CH-1").expect("CH-1");
        assert_eq!(c.status, ChargerStatus::Faulted);
        assert_eq!(c.fault_code.as_deref(), Some("over-temperature"));

        // Already fired.
        assert_eq!(apply_due_events(&mut s, at(3, 59), at(4, 0)), 0);
    }

    #[test]
    fn unknown_target_is_skipped() {
        let mut s = FleetState::new(SimClock::new(at(3, 59), 1));
        s.events = vec![fault(4, 0)];
        assert_eq!(apply_due_events(&mut s, at(3, 59), at(4, 0)), 1);
        assert!(s.events[0].fired);
    }

    #[test]
    fn restore_depends_on_connection() {
        let mut s = FleetState::new(SimClock::new(at(3, 59), 1));
        let mut plugged = Charger::new("CH-1", "central", 50.0, ChargerStatus::Faulted).with_vehicle("BUS-1");
        plugged.fault_code = Some("ground-fault".to_string());
        s.chargers = vec![plugged, Charger::new("CH-2", "central", 50.0, ChargerStatus::Offline)];
        s.vehicles = vec![
            Vehicle::new("BUS-1", "central", 40.0, 90.0, VehicleStatus::Charging).with_charger("CH-1"),
        ];

        for id in ["CH-1", "CH-2"] {
            let effect = EventEffect::ChargerRestored {
                charger_id: id.to_string(),
            };
            assert!(apply_effect(&mut s, &effect));
        }
        assert_eq!(s.charger("CH-1").map(|c| c.status), Some(ChargerStatus::Active));
        assert_eq!(s.charger("CH-1").and_then(|c| c.fault_code.clone()), None);
        assert_eq!(s.charger("CH-2").map(|c| c.status), Some(ChargerStatus::Available));
    }

    #[test]
    fn parses_from_toml() {
        let raw = r#"
            at = "06:15"
            title = "BLOCK-001 leaves"
            effect = { kind = "duty_status", duty_id = "BLOCK-001", status = "Departed" }
        "#;
        let event: ScenarioEvent = toml::from_str(raw).expect("valid event");
        assert_eq!(event.at, hm(6, 15));
        assert_eq!(
            event.effect,
            EventEffect::DutyStatus {
                duty_id: "BLOCK-001".to_string(),
                status: DutyStatus::Departed,
            }
        );
        assert!(!event.fired);
    }
}
