//! TOML-based fleet configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fleet::time::hhmm;
use crate::fleet::{
    Charger, ChargerStatus, Depot, DutyStatus, GridConstraint, Route, ScheduledDuty, Tariff,
    Vehicle, VehicleStatus,
};
use crate::fleet::vehicle::SERVICE_URGENT;
use crate::sim::clock::SimClock;
use crate::sim::engine::Simulation;
use crate::sim::event::{EventEffect, ScenarioEvent};
use crate::sim::state::{DEFAULT_ALERT_HISTORY, FleetState};

/// Top-level fleet configuration parsed from TOML.
///
/// Every table is optional. Load from TOML with
/// [`FleetConfig::from_toml_file`] or use a built-in preset via
/// [`FleetConfig::from_preset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    /// Clock and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub depots: Vec<Depot>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub chargers: Vec<Charger>,
    #[serde(default)]
    pub duties: Vec<ScheduledDuty>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub tariff: Tariff,
    /// Scenario timeline.
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

/// Clock and global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated calendar date (`"YYYY-MM-DD"`).
    pub date: NaiveDate,
    /// Time of day the clock starts at (`"HH:MM"`).
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Simulated minutes per tick (must be > 0).
    pub speed: u32,
    /// Whether the clock starts running.
    pub running: bool,
    /// Seed for telemetry jitter.
    pub seed: u64,
    /// Capacity of the resolved-alert log.
    pub alert_history: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or(NaiveDate::MIN),
            start_time: NaiveTime::from_hms_opt(5, 30, 0).unwrap_or(NaiveTime::MIN),
            speed: 1,
            running: true,
            seed: 42,
            alert_history: DEFAULT_ALERT_HISTORY,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"vehicles[BUS-101].soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to produce a fleet from configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown preset \"{name}\", available: {available}")]
    UnknownPreset { name: String, available: String },
    #[error("{} invalid field(s): {}", .0.len(), summarize(.0))]
    Invalid(Vec<ConfigError>),
}

fn summarize(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FleetConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["central", "morning_crisis", "north_peak"];

    /// Loads a fleet from a named preset.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownPreset`] if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, LoadError> {
        match name {
            "central" => Ok(Self::central()),
            "morning_crisis" => Ok(Self::morning_crisis()),
            "north_peak" => Ok(Self::north_peak()),
            _ => Err(LoadError::UnknownPreset {
                name: name.to_string(),
                available: Self::PRESETS.join(", "),
            }),
        }
    }

    /// Parses a fleet from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a fleet from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Toml`] if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(s)?)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.speed == 0 {
            errors.push(ConfigError::new("simulation.speed", "must be > 0"));
        }

        check_unique(&mut errors, "depots", self.depots.iter().map(|d| d.id.as_str()));
        check_unique(&mut errors, "vehicles", self.vehicles.iter().map(|v| v.id.as_str()));
        check_unique(&mut errors, "chargers", self.chargers.iter().map(|c| c.id.as_str()));
        check_unique(&mut errors, "duties", self.duties.iter().map(|d| d.id.as_str()));
        check_unique(&mut errors, "routes", self.routes.iter().map(|r| r.id.as_str()));

        let depot_ids: HashSet<&str> = self.depots.iter().map(|d| d.id.as_str()).collect();
        let vehicle_ids: HashSet<&str> = self.vehicles.iter().map(|v| v.id.as_str()).collect();
        let charger_ids: HashSet<&str> = self.chargers.iter().map(|c| c.id.as_str()).collect();
        let duty_ids: HashSet<&str> = self.duties.iter().map(|d| d.id.as_str()).collect();
        let known_depot = |field: String, id: &str, errors: &mut Vec<ConfigError>| {
            if !depot_ids.contains(id) {
                errors.push(ConfigError::new(field, format!("unknown depot \"{id}\"")));
            }
        };

        for d in &self.depots {
            let at = format!("depots[{}]", d.id);
            if d.max_capacity_mw <= 0.0 {
                errors.push(ConfigError::new(format!("{at}.max_capacity_mw"), "must be > 0"));
            }
            for (i, c) in d.constraints.iter().enumerate() {
                validate_constraint(&mut errors, &format!("{at}.constraints[{i}]"), c);
            }
        }

        for v in &self.vehicles {
            let at = format!("vehicles[{}]", v.id);
            known_depot(format!("{at}.depot_id"), &v.depot_id, &mut errors);
            check_percent(&mut errors, &format!("{at}.soc"), v.soc);
            check_percent(&mut errors, &format!("{at}.required_soc"), v.required_soc);
            check_percent(&mut errors, &format!("{at}.target_soc"), v.target_soc);
            check_percent(&mut errors, &format!("{at}.soh"), v.soh);
            if !(0.0..1.0).contains(&v.progress) {
                errors.push(ConfigError::new(format!("{at}.progress"), "must be in [0, 1)"));
            }
            if let Some(c) = &v.charger_id
                && !charger_ids.contains(c.as_str())
            {
                errors.push(ConfigError::new(format!("{at}.charger_id"), format!("unknown charger \"{c}\"")));
            }
            if let Some(d) = &v.assigned_duty
                && !duty_ids.contains(d.as_str())
            {
                errors.push(ConfigError::new(format!("{at}.assigned_duty"), format!("unknown duty \"{d}\"")));
            }
            if let Some(r) = &v.route
                && !self.routes.iter().any(|route| route.matches(r))
            {
                errors.push(ConfigError::new(format!("{at}.route"), format!("unknown route \"{r}\"")));
            }
        }

        for c in &self.chargers {
            let at = format!("chargers[{}]", c.id);
            known_depot(format!("{at}.depot_id"), &c.depot_id, &mut errors);
            if c.power_kw <= 0.0 {
                errors.push(ConfigError::new(format!("{at}.power_kw"), "must be > 0"));
            }
            if let Some(v) = &c.connected_vehicle
                && !vehicle_ids.contains(v.as_str())
            {
                errors.push(ConfigError::new(
                    format!("{at}.connected_vehicle"),
                    format!("unknown vehicle \"{v}\""),
                ));
            }
        }

        for d in &self.duties {
            let at = format!("duties[{}]", d.id);
            known_depot(format!("{at}.depot_id"), &d.depot_id, &mut errors);
            check_percent(&mut errors, &format!("{at}.required_soc"), d.required_soc);
            if !vehicle_ids.contains(d.vehicle_id.as_str()) {
                errors.push(ConfigError::new(
                    format!("{at}.vehicle_id"),
                    format!("unknown vehicle \"{}\"", d.vehicle_id),
                ));
            }
        }

        for r in &self.routes {
            if !r.depot_id.is_empty() {
                known_depot(format!("routes[{}].depot_id", r.id), &r.depot_id, &mut errors);
            }
        }

        for (i, p) in self.tariff.periods.iter().enumerate() {
            let at = format!("tariff.periods[{i}]");
            if p.start_hour >= p.end_hour || p.end_hour > 24 {
                errors.push(ConfigError::new(
                    format!("{at}.start_hour"),
                    "must be < end_hour, with end_hour <= 24",
                ));
            }
            if p.rate < 0.0 {
                errors.push(ConfigError::new(format!("{at}.rate"), "must be >= 0"));
            }
        }

        for (i, e) in self.events.iter().enumerate() {
            let at = format!("events[{i}].effect");
            let (kind, id, known) = match &e.effect {
                EventEffect::ChargerFault { charger_id, .. }
                | EventEffect::ChargerRestored { charger_id } => ("charger", charger_id, &charger_ids),
                EventEffect::VehicleStatus { vehicle_id, .. }
                | EventEffect::VehicleSoc { vehicle_id, .. }
                | EventEffect::Unplug { vehicle_id } => ("vehicle", vehicle_id, &vehicle_ids),
                EventEffect::DutyStatus { duty_id, .. } => ("duty", duty_id, &duty_ids),
                EventEffect::PlugIn {
                    vehicle_id,
                    charger_id,
                } => {
                    if !vehicle_ids.contains(vehicle_id.as_str()) {
                        errors.push(ConfigError::new(
                            at.clone(),
                            format!("unknown vehicle \"{vehicle_id}\""),
                        ));
                    }
                    ("charger", charger_id, &charger_ids)
                }
            };
            if !known.contains(id.as_str()) {
                errors.push(ConfigError::new(at, format!("unknown {kind} \"{id}\"")));
            }
        }

        errors
    }

    /// Validates the configuration and builds the initial fleet state.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Invalid`] with every problem found.
    pub fn into_state(self) -> Result<FleetState, LoadError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(LoadError::Invalid(errors));
        }

        let sim = &self.simulation;
        let mut clock = SimClock::new(sim.date.and_time(sim.start_time), sim.speed);
        if !sim.running {
            clock.pause();
        }

        let mut state = FleetState::new(clock);
        state.alert_history = sim.alert_history;
        state.vehicles = self.vehicles;
        state.chargers = self.chargers;
        state.depots = self.depots;
        state.schedule = self.duties;
        state.routes = self.routes;
        state.tariff = self.tariff;
        state.events = self.events;
        Ok(state)
    }

    /// Builds a seeded simulation with its initial orchestration pass done.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Invalid`] with every problem found.
    pub fn into_simulation(self) -> Result<Simulation, LoadError> {
        let seed = self.simulation.seed;
        Ok(Simulation::seeded(self.into_state()?, seed))
    }

    /// King's Cross depot at 05:30: a faulted charger under BUS-101 and a
    /// bus overdue for service, with two buses out on routes. North and East
    /// depots are listed alongside, with no fleet of their own yet.
    pub fn central() -> Self {
        let depot = Depot {
            location: "King's Cross, London".to_string(),
            lat: 51.532,
            lng: -0.124,
            ..Depot::new(CENTRAL, "Central Depot", 2.4)
        }
        .with_constraint(GridConstraint {
            start_hour: 0,
            end_hour: 24,
            max_capacity_percent: 100.0,
            description: "No restrictions".to_string(),
            months: None,
        });

        let mut chargers = vec![
            plugged(charger("CH-01", 50.0, ChargerStatus::Faulted), "BUS-101", 12.5),
            plugged(charger("CH-02", 150.0, ChargerStatus::Active), "BUS-103", 45.2),
            plugged(charger("CH-03", 150.0, ChargerStatus::Active), "BUS-106", 38.0),
            plugged(charger("CH-04", 50.0, ChargerStatus::Active), "BUS-107", 15.0),
            plugged(charger("CH-05", 150.0, ChargerStatus::Active), "BUS-108", 55.4),
            charger("CH-06", 150.0, ChargerStatus::Available),
            charger("CH-07", 150.0, ChargerStatus::Available),
            charger("CH-08", 150.0, ChargerStatus::Available),
        ];
        chargers[0].fault_code = Some("communication-timeout".to_string());

        let vehicles = vec![
            history(
                bus("BUS-101", "eCitaro", 35.0, 90.0, VehicleStatus::Charging)
                    .with_charger("CH-01")
                    .with_duty("BLOCK-001")
                    .with_health(98.0, 1.2),
                45_020.0,
                320,
                "2d",
            ),
            history(
                bus("BUS-102", "eCitaro", 95.0, 90.0, VehicleStatus::Idle)
                    .with_duty("BLOCK-002")
                    .with_health(99.0, 1.1),
                12_050.0,
                90,
                "14d",
            ),
            history(
                bus("BUS-103", "7900e", 88.0, 85.0, VehicleStatus::Charging)
                    .with_charger("CH-02")
                    .with_duty("BLOCK-003")
                    .with_health(97.0, 1.4),
                67_800.0,
                540,
                "5d",
            ),
            history(
                bus("BUS-104", "7900e", 92.0, 90.0, VehicleStatus::Idle)
                    .with_duty("BLOCK-004")
                    .with_health(88.0, 1.6),
                125_000.0,
                1100,
                SERVICE_URGENT,
            ),
            history(
                bus("BUS-105", "eCitaro", 98.0, 90.0, VehicleStatus::Idle).with_health(99.0, 1.0),
                2_100.0,
                15,
                "30d",
            ),
            history(
                bus("BUS-106", "eCitaro", 40.0, 45.0, VehicleStatus::Charging)
                    .with_charger("CH-03")
                    .with_duty("BLOCK-005")
                    .with_health(96.0, 1.2),
                52_300.0,
                410,
                "10d",
            ),
            history(
                bus("BUS-107", "eCitaro", 70.0, 80.0, VehicleStatus::Charging)
                    .with_charger("CH-04")
                    .with_health(95.0, 1.3),
                60_000.0,
                450,
                "20d",
            ),
            history(
                bus("BUS-108", "eCitaro", 78.0, 85.0, VehicleStatus::Charging)
                    .with_charger("CH-05")
                    .with_duty("BLOCK-006")
                    .with_health(97.0, 1.2),
                38_000.0,
                300,
                "9d",
            ),
            history(
                bus("BUS-109", "eCitaro", 82.0, 50.0, VehicleStatus::Driving)
                    .with_duty("BLOCK-007")
                    .with_route("Route 5A", 0.5)
                    .with_health(99.0, 1.3),
                33_000.0,
                240,
                "12d",
            ),
            history(
                bus("BUS-110", "eCitaro", 60.0, 50.0, VehicleStatus::Driving)
                    .with_duty("BLOCK-008")
                    .with_route("Route 10B", 0.7)
                    .with_health(98.0, 1.25),
                41_000.0,
                290,
                "18d",
            ),
        ];

        let duties = vec![
            block("BLOCK-001", "BUS-101", "06:15", 90.0, "J. Smith"),
            block("BLOCK-002", "BUS-102", "06:20", 90.0, "M. Doe"),
            block("BLOCK-003", "BUS-103", "06:30", 85.0, "A. Khan"),
            block("BLOCK-004", "BUS-104", "06:35", 90.0, "S. Lee"),
            block("BLOCK-005", "BUS-106", "06:45", 45.0, "K. Patel"),
            block("BLOCK-006", "BUS-108", "07:00", 85.0, "T. Wilson"),
            departed(block("BLOCK-007", "BUS-109", "05:00", 50.0, "R. Jones"), "route-5a", "Route 5A"),
            departed(block("BLOCK-008", "BUS-110", "05:10", 50.0, "L. Brown"), "route-10b", "Route 10B"),
        ];

        let routes = vec![
            Route {
                id: "route-5a".to_string(),
                name: "Route 5A".to_string(),
                depot_id: CENTRAL.to_string(),
                waypoints: vec![
                    [51.5320, -0.1240],
                    [51.5300, -0.1230],
                    [51.5280, -0.1200],
                    [51.5260, -0.1180],
                    [51.5240, -0.1160],
                ],
                distance_km: 145.0,
            },
            Route {
                id: "route-10b".to_string(),
                name: "Route 10B".to_string(),
                depot_id: CENTRAL.to_string(),
                waypoints: vec![
                    [51.5320, -0.1240],
                    [51.5340, -0.1260],
                    [51.5360, -0.1300],
                    [51.5380, -0.1350],
                ],
                distance_km: 132.0,
            },
        ];

        Self {
            simulation: SimulationConfig::default(),
            depots: vec![depot, north_depot(), east_depot()],
            vehicles,
            chargers,
            duties,
            routes,
            tariff: Tariff::default(),
            events: Vec::new(),
        }
    }

    /// Cold night at King's Cross: CH-01 drops out at 03:00 with BUS-101 at
    /// 32%, and BUS-106 charges too slowly on a 50 kW unit.
    pub fn morning_crisis() -> Self {
        let depot = Depot {
            location: "King's Cross, London".to_string(),
            lat: 51.532,
            lng: -0.124,
            ..Depot::new(CENTRAL, "Central Depot", 2.4)
        };

        let chargers = vec![
            plugged(charger("CH-01", 50.0, ChargerStatus::Active), "BUS-101", 0.0),
            plugged(charger("CH-02", 150.0, ChargerStatus::Active), "BUS-103", 0.0),
            plugged(charger("CH-03", 50.0, ChargerStatus::Active), "BUS-106", 0.0),
            charger("CH-04", 150.0, ChargerStatus::Available),
        ];

        let vehicles = vec![
            bus("BUS-101", "eCitaro", 32.0, 90.0, VehicleStatus::Charging)
                .with_charger("CH-01")
                .with_duty("BLOCK-001")
                .with_health(98.0, 1.2),
            bus("BUS-102", "eCitaro", 95.0, 90.0, VehicleStatus::Idle)
                .with_duty("BLOCK-002")
                .with_health(99.0, 1.1),
            bus("BUS-103", "7900e", 60.0, 85.0, VehicleStatus::Charging)
                .with_charger("CH-02")
                .with_duty("BLOCK-003")
                .with_health(97.0, 1.4),
            bus("BUS-105", "eCitaro", 98.0, 90.0, VehicleStatus::Idle).with_health(99.0, 1.0),
            bus("BUS-106", "eCitaro", 25.0, 95.0, VehicleStatus::Charging)
                .with_charger("CH-03")
                .with_duty("BLOCK-005")
                .with_health(96.0, 1.2),
        ];

        let duties = vec![
            block("BLOCK-001", "BUS-101", "06:15", 90.0, "J. Smith"),
            block("BLOCK-002", "BUS-102", "06:20", 90.0, "M. Doe"),
            block("BLOCK-003", "BUS-103", "06:30", 85.0, "A. Khan"),
            block("BLOCK-005", "BUS-106", "06:45", 95.0, "K. Patel"),
        ];

        let mut events = vec![ScenarioEvent::new(
            time("03:00"),
            "Charger offline",
            EventEffect::ChargerFault {
                charger_id: "CH-01".to_string(),
                fault_code: "communication-timeout".to_string(),
            },
        )];
        for (at, duty) in [
            ("06:15", "BLOCK-001"),
            ("06:20", "BLOCK-002"),
            ("06:30", "BLOCK-003"),
            ("06:45", "BLOCK-005"),
        ] {
            events.push(ScenarioEvent::new(
                time(at),
                format!("{duty} pulls out"),
                EventEffect::DutyStatus {
                    duty_id: duty.to_string(),
                    status: DutyStatus::Departed,
                },
            ));
        }

        Self {
            simulation: SimulationConfig {
                start_time: time("02:59"),
                ..SimulationConfig::default()
            },
            depots: vec![depot],
            vehicles,
            chargers,
            duties,
            routes: Vec::new(),
            tariff: Tariff::default(),
            events,
        }
    }

    /// Finsbury Park in the evening peak: a 50% grid cap from 16:00 with six
    /// 150 kW chargers running, and a charger trip at 16:30.
    pub fn north_peak() -> Self {
        let depot = north_depot();

        let plan = [
            ("BUS-201", 55.0, "17:30"),
            ("BUS-202", 60.0, "17:40"),
            ("BUS-203", 48.0, "17:50"),
            ("BUS-204", 65.0, "18:00"),
            ("BUS-205", 52.0, "18:15"),
            ("BUS-206", 58.0, "18:30"),
        ];
        let mut vehicles = Vec::new();
        let mut chargers = Vec::new();
        let mut duties = Vec::new();
        for (i, (id, soc, departure)) in plan.into_iter().enumerate() {
            let charger_id = format!("CH-N0{}", i + 1);
            let duty_id = format!("BLOCK-N0{}", i + 1);
            let mut v = bus(id, "eCitaro", soc, 85.0, VehicleStatus::Charging)
                .with_charger(charger_id.clone())
                .with_duty(duty_id.clone());
            v.depot_id = NORTH.to_string();
            vehicles.push(v);

            let mut c = plugged(charger(&charger_id, 150.0, ChargerStatus::Active), id, 0.0);
            c.depot_id = NORTH.to_string();
            chargers.push(c);

            let mut d = block(&duty_id, id, departure, 85.0, "");
            d.depot_id = NORTH.to_string();
            duties.push(d);
        }
        let mut reserve = bus("BUS-207", "eCitaro", 96.0, 85.0, VehicleStatus::Idle).with_health(97.0, 1.15);
        reserve.depot_id = NORTH.to_string();
        vehicles.push(reserve);

        let events = vec![
            ScenarioEvent::new(
                time("16:30"),
                "CH-N03 over-temperature trip",
                EventEffect::ChargerFault {
                    charger_id: "CH-N03".to_string(),
                    fault_code: "over-temperature".to_string(),
                },
            ),
            ScenarioEvent::new(
                time("17:00"),
                "CH-N03 back in service",
                EventEffect::ChargerRestored {
                    charger_id: "CH-N03".to_string(),
                },
            ),
        ];

        Self {
            simulation: SimulationConfig {
                start_time: time("15:50"),
                ..SimulationConfig::default()
            },
            depots: vec![depot],
            vehicles,
            chargers,
            duties,
            routes: Vec::new(),
            tariff: Tariff::default(),
            events,
        }
    }
}

const CENTRAL: &str = "central";
const NORTH: &str = "north";
const EAST: &str = "east";

/// Finsbury Park, capped to half its connection in the evening peak.
fn north_depot() -> Depot {
    Depot {
        location: "Finsbury Park, London".to_string(),
        lat: 51.564,
        lng: -0.106,
        ..Depot::new(NORTH, "North Depot", 1.8)
    }
    .with_constraint(GridConstraint {
        start_hour: 16,
        end_hour: 19,
        max_capacity_percent: 50.0,
        description: "50% cap during evening peak (16:00-19:00)".to_string(),
        months: None,
    })
}

/// Stratford, barred from daytime charging through the winter.
fn east_depot() -> Depot {
    Depot {
        location: "Stratford, London".to_string(),
        lat: 51.543,
        lng: -0.009,
        ..Depot::new(EAST, "East Depot", 1.2)
    }
    .with_constraint(GridConstraint {
        start_hour: 7,
        end_hour: 19,
        max_capacity_percent: 0.0,
        description: "No charging 07:00-19:00 (Nov-Mar)".to_string(),
        months: Some(vec![11, 12, 1, 2, 3]),
    })
}

fn time(raw: &str) -> NaiveTime {
    crate::fleet::time::parse_hhmm(raw).unwrap_or(NaiveTime::MIN)
}

fn bus(id: &str, model: &str, soc: f32, required_soc: f32, status: VehicleStatus) -> Vehicle {
    Vehicle {
        model: model.to_string(),
        location: "Depot".to_string(),
        ..Vehicle::new(id, CENTRAL, soc, required_soc, status)
    }
}

fn history(mut v: Vehicle, odometer_km: f32, cycles: u32, next_service: &str) -> Vehicle {
    v.odometer_km = odometer_km;
    v.cycles = cycles;
    v.next_service = next_service.to_string();
    v
}

fn charger(id: &str, power_kw: f32, status: ChargerStatus) -> Charger {
    Charger::new(id, CENTRAL, power_kw, status)
}

fn plugged(c: Charger, vehicle_id: &str, session_energy_kwh: f32) -> Charger {
    let mut c = c.with_vehicle(vehicle_id);
    c.session_energy_kwh = session_energy_kwh;
    c
}

fn block(id: &str, vehicle_id: &str, departure: &str, required_soc: f32, driver: &str) -> ScheduledDuty {
    let mut d = ScheduledDuty::new(id, CENTRAL, vehicle_id, time(departure), required_soc);
    d.driver = driver.to_string();
    d
}

fn departed(mut d: ScheduledDuty, route_id: &str, route_name: &str) -> ScheduledDuty {
    d.route_id = route_id.to_string();
    d.route_name = route_name.to_string();
    d.status = DutyStatus::Departed;
    d
}

fn check_unique<'a>(errors: &mut Vec<ConfigError>, kind: &str, ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            errors.push(ConfigError::new(format!("{kind}.id"), "must not be empty"));
        } else if !seen.insert(id) {
            errors.push(ConfigError::new(format!("{kind}[{id}].id"), "duplicate id"));
        }
    }
}

fn check_percent(errors: &mut Vec<ConfigError>, field: &str, value: f32) {
    if !(0.0..=100.0).contains(&value) {
        errors.push(ConfigError::new(field, "must be in [0, 100]"));
    }
}

fn validate_constraint(errors: &mut Vec<ConfigError>, at: &str, c: &GridConstraint) {
    if c.start_hour >= c.end_hour || c.end_hour > 24 {
        errors.push(ConfigError::new(
            format!("{at}.start_hour"),
            "must be < end_hour, with end_hour <= 24",
        ));
    }
    check_percent(errors, &format!("{at}.max_capacity_percent"), c.max_capacity_percent);
    if let Some(months) = &c.months
        && months.iter().any(|m| !(1..=12).contains(m))
    {
        errors.push(ConfigError::new(format!("{at}.months"), "must be in 1..=12"));
    }
}
