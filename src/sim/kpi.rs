//! Dashboard aggregates computed from the current fleet state.

use std::fmt;

use chrono::Timelike;
use serde::Serialize;

use crate::fleet::{Charger, ScheduledDuty, Vehicle, VehicleStatus};

use super::state::FleetState;

/// Vehicles within this many SoC points of the requirement count as ready.
pub const READINESS_MARGIN: f32 = 5.0;
/// CO2 avoided per km against a diesel bus (kg).
pub const CO2_KG_PER_KM: f32 = 0.89;
/// Odometer share counted as today's distance.
const DAILY_DISTANCE_FRACTION: f32 = 1.0 / 1000.0;

/// Vehicle counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub charging: usize,
    pub idle: usize,
    pub driving: usize,
    pub faulted: usize,
    pub maintenance: usize,
}

impl StatusCounts {
    pub fn get(&self, status: VehicleStatus) -> usize {
        match status {
            VehicleStatus::Charging => self.charging,
            VehicleStatus::Idle => self.idle,
            VehicleStatus::Driving => self.driving,
            VehicleStatus::Faulted => self.faulted,
            VehicleStatus::Maintenance => self.maintenance,
        }
    }

    fn add(&mut self, status: VehicleStatus) {
        let slot = match status {
            VehicleStatus::Charging => &mut self.charging,
            VehicleStatus::Idle => &mut self.idle,
            VehicleStatus::Driving => &mut self.driving,
            VehicleStatus::Faulted => &mut self.faulted,
            VehicleStatus::Maintenance => &mut self.maintenance,
        };
        *slot += 1;
    }
}

/// Read-only dashboard figures for one depot, or the whole fleet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Depot the figures cover; `None` for the whole fleet.
    pub depot_id: Option<String>,
    /// Share of duties whose vehicle is near its required SoC (%, whole number).
    pub fleet_readiness_pct: f32,
    /// Share of chargers neither faulted nor offline (%, whole number).
    pub charger_uptime_pct: f32,
    /// Load drawn by active chargers (kW).
    pub current_load_kw: f32,
    /// Grid connection capacity (kW).
    pub max_load_kw: f32,
    /// Unresolved alerts.
    pub active_alerts: usize,
    pub status_counts: StatusCounts,
    /// Vehicles short of their duty's SoC and not charging.
    pub vehicles_at_risk: usize,
    /// Session energy priced at the current tariff rate.
    pub today_energy_cost: f32,
    /// Saving against charging the same energy at the peak rate.
    pub today_savings: f32,
    /// CO2 avoided against diesel (kg).
    pub co2_avoided_kg: f32,
}

impl DashboardStats {
    /// Figures for one depot. An unknown depot yields empty figures.
    pub fn for_depot(state: &FleetState, depot_id: &str) -> Self {
        Self::compute(state, Some(depot_id))
    }

    /// Figures across every depot.
    pub fn fleet(state: &FleetState) -> Self {
        Self::compute(state, None)
    }

    fn compute(state: &FleetState, depot_id: Option<&str>) -> Self {
        let in_scope = |id: &str| depot_id.is_none_or(|d| d == id);

        let vehicles: Vec<&Vehicle> = state.vehicles.iter().filter(|v| in_scope(&v.depot_id)).collect();
        let chargers: Vec<&Charger> = state.chargers.iter().filter(|c| in_scope(&c.depot_id)).collect();
        let schedule: Vec<&ScheduledDuty> = state.schedule.iter().filter(|d| in_scope(&d.depot_id)).collect();

        let ready = schedule
            .iter()
            .filter(|d| {
                state
                    .vehicle(&d.vehicle_id)
                    .is_some_and(|v| v.soc >= d.required_soc - READINESS_MARGIN)
            })
            .count();
        let working = chargers.iter().filter(|c| c.status.is_working()).count();

        let mut status_counts = StatusCounts::default();
        for v in &vehicles {
            status_counts.add(v.status);
        }
        let vehicles_at_risk = vehicles
            .iter()
            .filter(|v| {
                v.status != VehicleStatus::Charging
                    && schedule
                        .iter()
                        .find(|d| d.vehicle_id == v.id)
                        .is_some_and(|d| v.soc < d.required_soc)
            })
            .count();

        let (current_load_kw, max_load_kw) = state
            .depots
            .iter()
            .filter(|d| in_scope(&d.id))
            .fold((0.0, 0.0), |(load, max), d| {
                (load + d.current_load_kw, max + d.max_capacity_kw())
            });

        let energy_kwh: f32 = chargers.iter().map(|c| c.session_energy_kwh).sum();
        let rate = state.tariff.rate_for_hour(state.now().hour()).rate;
        let today_energy_cost = energy_kwh * rate;
        let today_savings = (energy_kwh * state.tariff.peak_rate() - today_energy_cost).max(0.0);

        let distance_km: f32 =
            vehicles.iter().map(|v| v.odometer_km).sum::<f32>() * DAILY_DISTANCE_FRACTION;

        Self {
            depot_id: depot_id.map(str::to_string),
            fleet_readiness_pct: percent(ready, schedule.len()),
            charger_uptime_pct: percent(working, chargers.len()),
            current_load_kw,
            max_load_kw,
            active_alerts: state
                .alerts
                .iter()
                .filter(|a| !a.is_resolved() && in_scope(&a.depot_id))
                .count(),
            status_counts,
            vehicles_at_risk,
            today_energy_cost,
            today_savings,
            co2_avoided_kg: distance_km * CO2_KG_PER_KM,
        }
    }
}

/// Rounded share of `part` in `whole`; 100 for an empty whole.
fn percent(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        100.0
    } else {
        (part as f32 / whole as f32 * 100.0).round()
    }
}

impl fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- Depot {} ---",
            self.depot_id.as_deref().unwrap_or("(all)")
        )?;
        writeln!(f, "Fleet readiness:   {:.0}%", self.fleet_readiness_pct)?;
        writeln!(f, "Charger uptime:    {:.0}%", self.charger_uptime_pct)?;
        writeln!(
            f,
            "Grid load:         {:.0} / {:.0} kW",
            self.current_load_kw, self.max_load_kw
        )?;
        writeln!(
            f,
            "Vehicles:          {} charging, {} driving, {} at risk",
            self.status_counts.charging, self.status_counts.driving, self.vehicles_at_risk
        )?;
        writeln!(f, "Active alerts:     {}", self.active_alerts)?;
        writeln!(
            f,
            "Energy cost:       {:.2} (saved {:.2})",
            self.today_energy_cost, self.today_savings
        )?;
        write!(f, "CO2 avoided:       {:.1} kg", self.co2_avoided_kg)
    }
}

/// Per-depot figures plus the fleet total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetStats {
    pub depots: Vec<DashboardStats>,
    pub total: DashboardStats,
}

impl FleetStats {
    pub fn all(state: &FleetState) -> Self {
        Self {
            depots: state
                .depots
                .iter()
                .map(|d| DashboardStats::for_depot(state, &d.id))
                .collect(),
            total: DashboardStats::fleet(state),
        }
    }
}
