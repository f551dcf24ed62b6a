//! Swap-candidate search and confidence scoring.

use crate::fleet::{ScheduledDuty, Vehicle, VehicleStatus};

use super::MAX_CONFIDENCE;
use super::alert::{ActionType, ProposedAction};

/// Maximum number of swap candidates proposed per alert.
pub const MAX_CANDIDATES: usize = 3;

/// Vehicles that could take over `duty` from `at_risk`, best SoC first.
///
/// A candidate belongs to the duty's depot, already holds the required SoC,
/// is neither faulted, in maintenance nor driving, and is not committed to
/// another duty leaving at or before this one.
pub fn find_swap_candidates<'a>(
    vehicles: &'a [Vehicle],
    at_risk: &Vehicle,
    duty: &ScheduledDuty,
    schedule: &[ScheduledDuty],
) -> Vec<&'a Vehicle> {
    let mut candidates: Vec<&Vehicle> = vehicles
        .iter()
        .filter(|v| v.depot_id == duty.depot_id)
        .filter(|v| v.soc >= duty.required_soc)
        .filter(|v| !committed_earlier(v, duty, schedule))
        .filter(|v| v.status.can_cover_duty())
        .filter(|v| v.id != duty.vehicle_id && v.id != at_risk.id)
        .collect();

    // Stable sort keeps fleet order among equal SoC.
    candidates.sort_by(|a, b| b.soc.total_cmp(&a.soc));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

fn committed_earlier(vehicle: &Vehicle, duty: &ScheduledDuty, schedule: &[ScheduledDuty]) -> bool {
    let Some(other_id) = vehicle.assigned_duty.as_deref() else {
        return false;
    };
    if other_id == duty.id {
        return false;
    }
    schedule
        .iter()
        .find(|d| d.id == other_id)
        .is_some_and(|other| other.departure_time <= duty.departure_time)
}

/// Confidence (0-99) that `candidate` can cover `duty`.
///
/// Starts at 50 and rewards SoC surplus (up to +20), battery health, energy
/// efficiency and being free of any other duty.
pub fn swap_confidence(candidate: &Vehicle, duty: &ScheduledDuty) -> u8 {
    let mut confidence = 50.0_f32;

    let surplus = candidate.soc - duty.required_soc;
    confidence += (surplus / 2.0).min(20.0);

    if candidate.soh > 95.0 {
        confidence += 10.0;
    } else if candidate.soh > 90.0 {
        confidence += 5.0;
    }

    if candidate.efficiency < 1.3 {
        confidence += 10.0;
    } else if candidate.efficiency < 1.5 {
        confidence += 5.0;
    }

    if candidate.assigned_duty.is_none() {
        confidence += 10.0;
    }

    confidence.round().clamp(0.0, f32::from(MAX_CONFIDENCE)) as u8
}

/// One swap action per candidate; the first is recommended.
pub fn swap_actions(
    at_risk: &Vehicle,
    candidates: &[&Vehicle],
    duty: &ScheduledDuty,
) -> Vec<ProposedAction> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let surplus = c.soc - duty.required_soc;
            let location = if c.location.is_empty() {
                c.depot_id.as_str()
            } else {
                c.location.as_str()
            };
            ProposedAction::new(
                format!("action-swap-{i}"),
                format!("Swap with {}", c.id),
                format!(
                    "{} has {}% SoC ({surplus:.0}% surplus). Available in {location}.",
                    c.id, c.soc
                ),
                ActionType::Swap,
                swap_confidence(c, duty),
            )
            .with_vehicles(at_risk.id.clone(), Some(c.id.clone()))
            .recommended(i == 0)
        })
        .collect()
}
