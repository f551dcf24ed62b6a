//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use depot_orchestrator::config::FleetConfig;
use depot_orchestrator::fleet::{
    Charger, ChargerStatus, Depot, ScheduledDuty, Vehicle, VehicleStatus,
};
use depot_orchestrator::orchestration::Alert;
use depot_orchestrator::sim::{FleetState, SimClock};

/// Installs a test subscriber honouring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Timestamp on the default simulated date (2025-01-15).
pub fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 15)
        .and_then(|d| d.and_hms_opt(h, m, 0))
        .expect("valid timestamp")
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

/// Empty fleet at `central` (1 MW) with the clock at `h:m`.
pub fn empty_depot(h: u32, m: u32, speed: u32) -> FleetState {
    let mut state = FleetState::new(SimClock::new(at(h, m), speed));
    state.depots = vec![Depot::new("central", "Central Depot", 1.0)];
    state
}

/// BUS-101 stuck at 32% on faulted CH-01 for a 06:15 departure, with
/// BUS-105 in reserve at 98%. Clock at 04:00.
pub fn charger_fault_fleet() -> FleetState {
    let mut state = empty_depot(4, 0, 1);
    let mut ch = Charger::new("CH-01", "central", 50.0, ChargerStatus::Faulted).with_vehicle("BUS-101");
    ch.fault_code = Some("communication-timeout".to_string());
    state.chargers = vec![ch];
    state.vehicles = vec![
        Vehicle::new("BUS-101", "central", 32.0, 90.0, VehicleStatus::Charging)
            .with_charger("CH-01")
            .with_duty("BLOCK-001"),
        Vehicle::new("BUS-105", "central", 98.0, 90.0, VehicleStatus::Idle).with_health(99.0, 1.0),
    ];
    state.schedule = vec![ScheduledDuty::new(
        "BLOCK-001",
        "central",
        "BUS-101",
        hm(6, 15),
        90.0,
    )];
    state
}

/// Valid initial state for a named preset.
pub fn preset_state(name: &str) -> FleetState {
    FleetConfig::from_preset(name)
        .and_then(FleetConfig::into_state)
        .expect("preset is valid")
}

/// Alerts with ids blanked, for comparing runs.
pub fn without_ids(alerts: &[Alert]) -> Vec<Alert> {
    alerts
        .iter()
        .cloned()
        .map(|mut a| {
            a.id = String::new();
            a
        })
        .collect()
}

/// Asserts that no two live alerts at one depot share a de-duplication key.
pub fn assert_unique_keys(alerts: &[Alert]) {
    let mut seen = HashSet::new();
    for alert in alerts.iter().filter(|a| !a.is_resolved()) {
        assert!(
            seen.insert((alert.depot_id.clone(), alert.dedup_key())),
            "duplicate live alert {} at {}",
            alert.dedup_key(),
            alert.depot_id
        );
    }
}
