//! Physical state update for one simulated tick.
//!
//! Time moves forward by `speed` minutes, due scenario events are applied,
//! then driving vehicles drain and move along their route, charging vehicles
//! gain SoC, chargers report fresh telemetry and depot loads are summed.

use tracing::debug;

use crate::fleet::vehicle::charge_rate_per_minute;
use crate::fleet::{Charger, ChargerStatus, Route, Vehicle, VehicleStatus, round_tenth};
use crate::orchestration::{self, AlertIdGenerator};

use super::event::apply_due_events;
use super::links;
use super::noise::NoiseSource;
use super::state::FleetState;

/// Lap progress gained per simulated minute of driving.
pub const DRIVE_PROGRESS_PER_MINUTE: f32 = 0.02;
/// SoC drained per simulated minute of driving (percentage points).
pub const DRIVE_DRAIN_PER_MINUTE: f32 = 0.05;

/// Advances the clock by one tick and updates physical state in place.
///
/// Returns `false`, leaving `state` untouched, when the clock is paused.
/// Alerts are not refreshed; see [`tick`] for the full step.
pub fn advance<N: NoiseSource + ?Sized>(state: &mut FleetState, noise: &mut N) -> bool {
    let Some((previous, now)) = state.clock.advance() else {
        return false;
    };
    let speed = state.clock.speed() as f32;

    let fired = apply_due_events(state, previous, now);
    update_vehicles(state, speed);
    update_chargers(&mut state.chargers, speed, noise);
    update_depot_loads(state);

    debug!(
        time = %now.format("%H:%M"),
        speed = state.clock.speed(),
        events = fired,
        "tick"
    );
    links::debug_check(state, "tick");
    true
}

/// Returns the state one tick later, with alerts refreshed.
///
/// A paused clock yields an unchanged copy.
pub fn tick<N, G>(state: &FleetState, noise: &mut N, ids: &mut G) -> FleetState
where
    N: NoiseSource + ?Sized,
    G: AlertIdGenerator + ?Sized,
{
    let mut next = state.clone();
    if advance(&mut next, noise) {
        orchestration::refresh_alerts(&mut next, ids);
    }
    next
}

fn update_vehicles(state: &mut FleetState, speed: f32) {
    let FleetState {
        vehicles,
        chargers,
        routes,
        ..
    } = state;

    for vehicle in vehicles.iter_mut() {
        match vehicle.status {
            VehicleStatus::Driving => drive(vehicle, routes, speed),
            VehicleStatus::Charging => {
                let charger = vehicle
                    .charger_id
                    .as_deref()
                    .and_then(|id| chargers.iter().find(|c| c.id == id))
                    .filter(|c| c.status == ChargerStatus::Active);
                if let Some(charger) = charger {
                    charge(vehicle, charger.power_kw, speed);
                }
            }
            _ => {}
        }
    }
}

fn drive(vehicle: &mut Vehicle, routes: &[Route], speed: f32) {
    let Some(key) = vehicle.route.as_deref() else {
        return;
    };
    vehicle.progress = (vehicle.progress + DRIVE_PROGRESS_PER_MINUTE * speed) % 1.0;
    vehicle.soc = round_tenth((vehicle.soc - DRIVE_DRAIN_PER_MINUTE * speed).max(0.0));

    // Unknown routes and routes without a segment keep the last position.
    if let Some((lat, lng)) = routes
        .iter()
        .find(|r| r.matches(key))
        .and_then(|r| r.position_at(vehicle.progress))
    {
        vehicle.lat = lat;
        vehicle.lng = lng;
    }
}

fn charge(vehicle: &mut Vehicle, power_kw: f32, speed: f32) {
    let rate = charge_rate_per_minute(power_kw);
    if rate <= 0.0 {
        return;
    }
    vehicle.soc = round_tenth((vehicle.soc + rate * speed).min(100.0));
    vehicle.charging_time_remaining = ((vehicle.target_soc - vehicle.soc) / rate).max(0.0).round();
    vehicle.predicted_soc_at_departure =
        (vehicle.soc + rate * vehicle.charging_time_remaining).min(100.0).round();
}

fn update_chargers<N: NoiseSource + ?Sized>(chargers: &mut [Charger], speed: f32, noise: &mut N) {
    for charger in chargers
        .iter_mut()
        .filter(|c| c.status == ChargerStatus::Active && c.connected_vehicle.is_some())
    {
        let high_power = charger.is_high_power();
        charger.current_a = if high_power {
            180.0 + noise.unit() * 20.0
        } else {
            100.0 + noise.unit() * 20.0
        }
        .round();
        charger.voltage_v = if high_power {
            740.0 + noise.unit() * 20.0
        } else {
            395.0 + noise.unit() * 10.0
        }
        .round();
        charger.power_delivery_kw = (charger.power_kw * (0.9 + noise.unit() * 0.1)).round();
        charger.session_energy_kwh =
            round_tenth(charger.session_energy_kwh + charger.power_kw / 60.0 * speed);
    }
}

fn update_depot_loads(state: &mut FleetState) {
    let FleetState {
        depots, chargers, ..
    } = state;

    for depot in depots.iter_mut() {
        let active = chargers
            .iter()
            .filter(|c| c.depot_id == depot.id && c.status == ChargerStatus::Active);
        depot.current_load_kw = active.clone().map(|c| c.power_delivery_kw).sum();
        depot.active_chargers = active.count();
    }
}
