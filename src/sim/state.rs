//! The complete in-memory domain state.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::fleet::{Charger, Depot, Route, ScheduledDuty, Tariff, Vehicle};
use crate::orchestration::Alert;

use super::clock::SimClock;
use super::event::ScenarioEvent;

/// Default capacity of the resolved-alert log.
pub const DEFAULT_ALERT_HISTORY: usize = 50;

/// Everything the tick, the orchestration engine and the executor read or
/// write. Owned by one logical thread of control at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetState {
    pub clock: SimClock,
    pub vehicles: Vec<Vehicle>,
    pub chargers: Vec<Charger>,
    pub depots: Vec<Depot>,
    pub schedule: Vec<ScheduledDuty>,
    pub routes: Vec<Route>,
    pub tariff: Tariff,
    /// Scenario timeline applied by the tick.
    pub events: Vec<ScenarioEvent>,
    /// Live alerts, unresolved.
    pub alerts: Vec<Alert>,
    /// Recently resolved alerts, oldest first.
    pub resolved_log: VecDeque<Alert>,
    /// Capacity of `resolved_log`.
    pub alert_history: usize,
}

impl FleetState {
    /// Creates an empty fleet with the default tariff.
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            vehicles: Vec::new(),
            chargers: Vec::new(),
            depots: Vec::new(),
            schedule: Vec::new(),
            routes: Vec::new(),
            tariff: Tariff::default(),
            events: Vec::new(),
            alerts: Vec::new(),
            resolved_log: VecDeque::new(),
            alert_history: DEFAULT_ALERT_HISTORY,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn vehicle_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn charger(&self, id: &str) -> Option<&Charger> {
        self.chargers.iter().find(|c| c.id == id)
    }

    pub fn charger_mut(&mut self, id: &str) -> Option<&mut Charger> {
        self.chargers.iter_mut().find(|c| c.id == id)
    }

    pub fn duty(&self, id: &str) -> Option<&ScheduledDuty> {
        self.schedule.iter().find(|d| d.id == id)
    }

    pub fn duty_mut(&mut self, id: &str) -> Option<&mut ScheduledDuty> {
        self.schedule.iter_mut().find(|d| d.id == id)
    }

    pub fn depot(&self, id: &str) -> Option<&Depot> {
        self.depots.iter().find(|d| d.id == id)
    }

    pub fn alert(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Appends to the resolved log, evicting the oldest entries past capacity.
    pub fn record_resolved(&mut self, alert: Alert) {
        if self.alert_history == 0 {
            return;
        }
        while self.resolved_log.len() >= self.alert_history {
            self.resolved_log.pop_front();
        }
        self.resolved_log.push_back(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::VehicleStatus;
    use crate::orchestration::{AlertCategory, Severity};
    use chrono::NaiveDate;

    fn state() -> FleetState {
        let start = NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(5, 30, 0))
            .expect("valid timestamp");
        FleetState::new(SimClock::new(start, 1))
    }

    #[test]
    fn lookups_by_id() {
        let mut s = state();
        s.vehicles
            .push(Vehicle::new("BUS-1", "central", 50.0, 90.0, VehicleStatus::Idle));
        assert!(s.vehicle("BUS-1").is_some());
        assert!(s.vehicle("BUS-2").is_none());
        if let Some(v) = s.vehicle_mut("BUS-1") {
            v.soc = 60.0;
        }
        assert_eq!(s.vehicle("BUS-1").map(|v| v.soc), Some(60.0));
    }

    #[test]
    fn resolved_log_is_bounded() {
        let mut s = state();
        s.alert_history = 2;
        for i in 0..5 {
            let a = Alert::new(
                format!("A-{i}"),
                Severity::Info,
                AlertCategory::Maintenance,
                "central",
                s.now(),
            );
            s.record_resolved(a);
        }
        let ids: Vec<&str> = s.resolved_log.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A-3", "A-4"]);
    }
}
