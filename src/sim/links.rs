//! Bidirectional link maintenance.
//!
//! Two links are kept symmetric: `vehicle.charger_id` with
//! `charger.connected_vehicle`, and `vehicle.assigned_duty` with
//! `duty.vehicle_id`. Every mutation of either side goes through this module.

use thiserror::Error;
use tracing::{info, warn};

use crate::fleet::{ChargerStatus, DutyStatus, VehicleStatus};

use super::state::FleetState;

/// An asymmetric or dangling link found by [`check_links`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkViolation {
    #[error("{vehicle_id} references missing charger {charger_id}")]
    MissingCharger {
        vehicle_id: String,
        charger_id: String,
    },
    #[error("{vehicle_id} is on {charger_id} but the charger reports {connected:?}")]
    ChargerMismatch {
        vehicle_id: String,
        charger_id: String,
        connected: Option<String>,
    },
    #[error("{charger_id} reports {vehicle_id} which is not plugged into it")]
    StaleCharger {
        charger_id: String,
        vehicle_id: String,
    },
    #[error("{vehicle_id} references missing duty {duty_id}")]
    MissingDuty { vehicle_id: String, duty_id: String },
    #[error("{vehicle_id} holds {duty_id} but the duty belongs to {holder}")]
    DutyMismatch {
        vehicle_id: String,
        duty_id: String,
        holder: String,
    },
}

/// Plugs a vehicle into a charger, releasing any previous link on either side.
///
/// A charger that was `Available` becomes `Active` and the vehicle starts
/// `Charging`. A faulted or offline charger is linked without changing either
/// status. Returns `false` (and changes nothing) if either id is unknown.
pub fn connect_charger(state: &mut FleetState, vehicle_id: &str, charger_id: &str) -> bool {
    if state.vehicle(vehicle_id).is_none() || state.charger(charger_id).is_none() {
        return false;
    }

    disconnect_charger(state, vehicle_id);
    let occupant = state
        .charger(charger_id)
        .and_then(|c| c.connected_vehicle.clone());
    if let Some(occupant) = occupant {
        disconnect_charger(state, &occupant);
    }

    let mut active = false;
    if let Some(charger) = state.charger_mut(charger_id) {
        if charger.status == ChargerStatus::Available {
            charger.status = ChargerStatus::Active;
        }
        charger.connected_vehicle = Some(vehicle_id.to_string());
        charger.session_energy_kwh = 0.0;
        active = charger.status == ChargerStatus::Active;
    }
    if let Some(vehicle) = state.vehicle_mut(vehicle_id) {
        vehicle.charger_id = Some(charger_id.to_string());
        if active {
            vehicle.status = VehicleStatus::Charging;
        }
    }
    info!(vehicle = vehicle_id, charger = charger_id, "vehicle plugged in");
    true
}

/// Unplugs a vehicle from its charger, if any.
///
/// The charger drops back to `Available` if it was `Active` and its readings
/// are cleared; a charging vehicle becomes `Idle`. Returns `false` if the
/// vehicle is unknown or not plugged in.
pub fn disconnect_charger(state: &mut FleetState, vehicle_id: &str) -> bool {
    let Some(vehicle) = state.vehicle_mut(vehicle_id) else {
        return false;
    };
    let Some(charger_id) = vehicle.charger_id.take() else {
        return false;
    };
    if vehicle.status == VehicleStatus::Charging {
        vehicle.status = VehicleStatus::Idle;
    }
    vehicle.charging_time_remaining = 0.0;

    if let Some(charger) = state.charger_mut(&charger_id)
        && charger.connected_vehicle.as_deref() == Some(vehicle_id)
    {
        charger.connected_vehicle = None;
        if charger.status == ChargerStatus::Active {
            charger.status = ChargerStatus::Available;
        }
        charger.clear_readings();
    }
    true
}

/// Hands a duty to another vehicle and resets its status to `Scheduled`.
///
/// The previous holder is released from whatever duty it held. Returns
/// `false` (and changes nothing) if the duty or the vehicle is unknown.
pub fn assign_duty(state: &mut FleetState, duty_id: &str, vehicle_id: &str) -> bool {
    if state.vehicle(vehicle_id).is_none() {
        return false;
    }
    let Some(duty) = state.duty_mut(duty_id) else {
        return false;
    };
    let previous = std::mem::replace(&mut duty.vehicle_id, vehicle_id.to_string());
    duty.status = DutyStatus::Scheduled;

    if previous != vehicle_id
        && let Some(old) = state.vehicle_mut(&previous)
    {
        old.assigned_duty = None;
    }
    if let Some(vehicle) = state.vehicle_mut(vehicle_id) {
        vehicle.assigned_duty = Some(duty_id.to_string());
    }
    info!(duty = duty_id, from = %previous, to = vehicle_id, "duty reassigned");
    true
}

/// Reports every asymmetric or dangling link in `state`.
///
/// A duty may reference a vehicle whose `assigned_duty` points elsewhere (a
/// vehicle can run several duties in a day); only the vehicle side is checked
/// for duties.
pub fn check_links(state: &FleetState) -> Vec<LinkViolation> {
    let mut violations = Vec::new();

    for vehicle in &state.vehicles {
        if let Some(charger_id) = &vehicle.charger_id {
            match state.charger(charger_id) {
                None => violations.push(LinkViolation::MissingCharger {
                    vehicle_id: vehicle.id.clone(),
                    charger_id: charger_id.clone(),
                }),
                Some(c) if c.connected_vehicle.as_deref() != Some(vehicle.id.as_str()) => {
                    violations.push(LinkViolation::ChargerMismatch {
                        vehicle_id: vehicle.id.clone(),
                        charger_id: charger_id.clone(),
                        connected: c.connected_vehicle.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(duty_id) = &vehicle.assigned_duty {
            match state.duty(duty_id) {
                None => violations.push(LinkViolation::MissingDuty {
                    vehicle_id: vehicle.id.clone(),
                    duty_id: duty_id.clone(),
                }),
                Some(d) if d.vehicle_id != vehicle.id => {
                    violations.push(LinkViolation::DutyMismatch {
                        vehicle_id: vehicle.id.clone(),
                        duty_id: duty_id.clone(),
                        holder: d.vehicle_id.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    for charger in &state.chargers {
        if let Some(vehicle_id) = &charger.connected_vehicle {
            let linked = state
                .vehicle(vehicle_id)
                .is_some_and(|v| v.charger_id.as_deref() == Some(charger.id.as_str()));
            if !linked {
                violations.push(LinkViolation::StaleCharger {
                    charger_id: charger.id.clone(),
                    vehicle_id: vehicle_id.clone(),
                });
            }
        }
    }

    violations
}

/// Logs link violations after a mutation; compiled out of release builds.
pub(crate) fn debug_check(state: &FleetState, after: &str) {
    if cfg!(debug_assertions) {
        for violation in check_links(state) {
            warn!(after, %violation, "link consistency violation");
        }
    }
}
