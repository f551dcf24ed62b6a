//! Applying a chosen remediation to the fleet.

use tracing::{info, warn};

use crate::fleet::ScheduledDuty;
use crate::sim::links;
use crate::sim::state::FleetState;

use super::alert::{ActionType, ProposedAction, Resolution};
use super::ids::AlertIdGenerator;

/// Applies `action_id` of live alert `alert_id`, then refreshes alerts.
///
/// Returns `false` and leaves `state` untouched when either id is unknown;
/// a consumer acting on a slightly older snapshot is expected to hit this.
///
/// Only swaps change the fleet: an open duty currently held by the source
/// vehicle moves to the target vehicle and goes back to `Scheduled`. The
/// alert's own duty is preferred when the source still holds it. Every other
/// action type just closes the alert.
pub fn apply_resolution<G: AlertIdGenerator + ?Sized>(
    state: &mut FleetState,
    alert_id: &str,
    action_id: &str,
    ids: &mut G,
) -> bool {
    let Some(index) = state
        .alerts
        .iter()
        .position(|a| a.id == alert_id && !a.is_resolved())
    else {
        warn!(alert = alert_id, "resolve ignored: no such live alert");
        return false;
    };
    let Some(action) = state.alerts[index].action(action_id).cloned() else {
        warn!(alert = alert_id, action = action_id, "resolve ignored: no such action");
        return false;
    };

    if action.action_type == ActionType::Swap {
        let alert_duty = state.alerts[index].duty_id.clone();
        apply_swap(state, &action, alert_duty.as_deref());
    }

    let summary = match action.action_type {
        ActionType::Acknowledge => "Acknowledged".to_string(),
        _ => action.label.clone(),
    };
    let resolved_at = state.now();
    state.alerts[index].resolution = Some(Resolution {
        resolved_at,
        action_id: action.id.clone(),
        summary,
    });
    info!(
        alert = alert_id,
        action = action_id,
        kind = ?action.action_type,
        "alert resolved"
    );

    links::debug_check(state, "resolve");
    super::refresh_alerts(state, ids);
    true
}

/// Functional form of [`apply_resolution`]: returns the resulting state.
///
/// An unknown alert or action yields a state equal to the input.
pub fn resolve<G: AlertIdGenerator + ?Sized>(
    alert_id: &str,
    action_id: &str,
    state: &FleetState,
    ids: &mut G,
) -> FleetState {
    let mut next = state.clone();
    apply_resolution(&mut next, alert_id, action_id, ids);
    next
}

fn apply_swap(state: &mut FleetState, action: &ProposedAction, alert_duty: Option<&str>) {
    let (Some(source), Some(target)) = (
        action.source_vehicle_id.as_deref(),
        action.target_vehicle_id.as_deref(),
    ) else {
        return;
    };
    // Re-resolve the duty from the live assignment, not the alert snapshot.
    let open: Vec<&ScheduledDuty> = state
        .schedule
        .iter()
        .filter(|d| d.vehicle_id == source && !d.status.is_closed())
        .collect();
    let Some(duty_id) = open
        .iter()
        .find(|d| Some(d.id.as_str()) == alert_duty)
        .or(open.first())
        .map(|d| d.id.clone())
    else {
        warn!(source, "swap found no open duty held by source vehicle");
        return;
    };
    if !links::assign_duty(state, &duty_id, target) {
        warn!(duty = %duty_id, target, "swap target vehicle not found");
    }
}
