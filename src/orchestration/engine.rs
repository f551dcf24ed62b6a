//! Risk scan over the current fleet state.
//!
//! [`evaluate`] is a pure function of its inputs apart from the injected id
//! generator: it never mutates the fleet and always runs every pass, in
//! order, over duties, then depots, then vehicles.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::fleet::time::minutes_until;
use crate::fleet::vehicle::charge_rate_per_minute;
use crate::fleet::{
    Charger, ChargerStatus, Depot, DutyStatus, ScheduledDuty, Vehicle, VehicleStatus,
};

use super::alert::{ActionType, Alert, AlertCategory, ProposedAction, Severity};
use super::ids::AlertIdGenerator;
use super::swap::{find_swap_candidates, swap_actions};

/// Penalty for a pull-out blocked by a charger fault.
pub const CHARGING_FAULT_PENALTY: u32 = 2400;
/// Penalty for an idle vehicle short of charge before departure.
pub const PULL_OUT_PENALTY: u32 = 1800;
/// Penalty for charging that will not finish in time.
pub const SOC_DEVIATION_PENALTY: u32 = 1200;
/// Demand-charge exposure when grid load is high.
pub const GRID_WARNING_PENALTY: u32 = 2000;
/// Demand-charge exposure when grid load is critical.
pub const GRID_CRITICAL_PENALTY: u32 = 5000;

/// An idle vehicle this far below required SoC is flagged (points).
pub const IDLE_DEFICIT_MARGIN: f32 = 5.0;
/// Deficit beyond which an idle vehicle is critical (points).
pub const IDLE_CRITICAL_DEFICIT: f32 = 20.0;
/// Idle vehicles are only flagged this close to departure (minutes).
pub const IDLE_LOOKAHEAD_MINUTES: i64 = 90;
/// Charging must finish this long before departure (minutes).
pub const CHARGING_SAFETY_BUFFER_MINUTES: f32 = 10.0;

/// Grid load above which a warning is raised (% of allowed capacity).
pub const GRID_WARNING_PERCENT: f32 = 85.0;
/// Grid load above which the alert turns critical (% of allowed capacity).
pub const GRID_CRITICAL_PERCENT: f32 = 95.0;

/// Confidence of "Move to Working Charger" on a charging fault. With no
/// swap candidate it is also the alert's `confidence_score`.
const FAULT_FALLBACK_CONFIDENCE: u8 = 50;
const PRIORITIZE_CONFIDENCE: u8 = 70;
const BOOST_CONFIDENCE: u8 = 60;
const ACCEPT_PARTIAL_CONFIDENCE: u8 = 50;
const LOAD_SHED_CONFIDENCE: u8 = 85;
const LOAD_SHED_SAVINGS: u32 = 500;
const MONITOR_CONFIDENCE: u8 = 40;
const RESERVE_CONFIDENCE: u8 = 90;
const CLEAR_FOR_SERVICE_CONFIDENCE: u8 = 60;

/// Scans duties, depots and vehicles and returns a fresh alert set.
///
/// Alerts come back in pass order (pull-out risks, grid constraints,
/// maintenance) and, within a pass, in input order.
pub fn evaluate<G: AlertIdGenerator + ?Sized>(
    vehicles: &[Vehicle],
    chargers: &[Charger],
    schedule: &[ScheduledDuty],
    depots: &[Depot],
    now: NaiveDateTime,
    ids: &mut G,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for duty in schedule {
        pull_out_checks(duty, vehicles, chargers, schedule, now, ids, &mut alerts);
    }
    let pull_out = alerts.len();

    for depot in depots {
        if let Some(alert) = grid_check(depot, now, ids) {
            alerts.push(alert);
        }
    }
    let grid = alerts.len() - pull_out;

    for vehicle in vehicles {
        if let Some(alert) = maintenance_check(vehicle, vehicles, schedule, now, ids) {
            alerts.push(alert);
        }
    }
    let maintenance = alerts.len() - pull_out - grid;

    debug!(
        time = %now.format("%H:%M"),
        pull_out,
        grid,
        maintenance,
        "orchestration pass complete"
    );
    alerts
}

fn pull_out_checks<G: AlertIdGenerator + ?Sized>(
    duty: &ScheduledDuty,
    vehicles: &[Vehicle],
    chargers: &[Charger],
    schedule: &[ScheduledDuty],
    now: NaiveDateTime,
    ids: &mut G,
    alerts: &mut Vec<Alert>,
) {
    if duty.status.is_closed() {
        return;
    }
    let Some(vehicle) = vehicles.iter().find(|v| v.id == duty.vehicle_id) else {
        return;
    };
    let charger = vehicle
        .charger_id
        .as_deref()
        .and_then(|id| chargers.iter().find(|c| c.id == id));

    let minutes = minutes_until(duty.departure_time, now);
    if minutes < 0 {
        return;
    }
    let deadline = now + Duration::minutes(minutes);
    let departure = duty.departure_time.format("%H:%M");

    if let Some(charger) = charger.filter(|c| c.status == ChargerStatus::Faulted)
        && vehicle.soc < duty.required_soc
    {
        let candidates = find_swap_candidates(vehicles, vehicle, duty, schedule);
        let mut actions = swap_actions(vehicle, &candidates, duty);
        let no_swap = actions.is_empty();
        actions.push(
            ProposedAction::new(
                "action-relocate",
                "Move to Working Charger",
                format!("Unplug {} from {} and reconnect on a working charger.", vehicle.id, charger.id),
                ActionType::Prioritize,
                FAULT_FALLBACK_CONFIDENCE,
            )
            .recommended(no_swap),
        );

        let mut alert = Alert::new(
            ids.next_id(),
            Severity::Critical,
            AlertCategory::ChargingFault,
            duty.depot_id.clone(),
            now,
        );
        alert.title = "Charger Fault - Pull-out at Risk".to_string();
        alert.message = format!(
            "{} offline ({}). {} stuck at {}% SoC. Requires {}% for {departure} departure.",
            charger.id,
            charger.fault_code.as_deref().unwrap_or("fault"),
            vehicle.id,
            vehicle.soc,
            duty.required_soc,
        );
        alert.vehicle_id = Some(vehicle.id.clone());
        alert.charger_id = Some(charger.id.clone());
        alert.duty_id = Some(duty.id.clone());
        alert.deadline = Some(deadline);
        alert.impact_description = format!(
            "Service {} may fail. Driver {} assignment affected.",
            duty.service_name(),
            if duty.driver.is_empty() { "TBC" } else { &duty.driver },
        );
        alert.affected_services = 1;
        alert.penalty_risk = CHARGING_FAULT_PENALTY;
        alert.confidence_score = top_confidence(&actions);
        alert.proposed_actions = actions;
        alerts.push(alert);
    }

    let deficit = duty.required_soc - vehicle.soc;
    if vehicle.status == VehicleStatus::Idle
        && deficit > IDLE_DEFICIT_MARGIN
        && minutes < IDLE_LOOKAHEAD_MINUTES
    {
        let candidates = find_swap_candidates(vehicles, vehicle, duty, schedule);
        let mut actions = vec![
            ProposedAction::new(
                "action-prioritize",
                "Prioritize Charging",
                format!("Move {} to an available charger immediately.", vehicle.id),
                ActionType::Prioritize,
                PRIORITIZE_CONFIDENCE,
            )
            .recommended(candidates.is_empty()),
        ];
        actions.extend(swap_actions(vehicle, &candidates, duty));

        let severity = if deficit > IDLE_CRITICAL_DEFICIT {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let mut alert = Alert::new(
            ids.next_id(),
            severity,
            AlertCategory::PullOutRisk,
            duty.depot_id.clone(),
            now,
        );
        alert.title = "Vehicle Not Charging".to_string();
        alert.message = format!(
            "{} is idle at {}% SoC but needs {}% for {departure}.",
            vehicle.id, vehicle.soc, duty.required_soc,
        );
        alert.vehicle_id = Some(vehicle.id.clone());
        alert.duty_id = Some(duty.id.clone());
        alert.deadline = Some(deadline);
        alert.impact_description =
            format!("{minutes} minutes until departure. {deficit:.0}% charge deficit.");
        alert.affected_services = 1;
        alert.penalty_risk = PULL_OUT_PENALTY;
        alert.confidence_score = top_confidence(&actions);
        alert.proposed_actions = actions;
        alerts.push(alert);
    }

    if let Some(charger) = charger.filter(|c| c.status == ChargerStatus::Active)
        && vehicle.status == VehicleStatus::Charging
    {
        let rate = charge_rate_per_minute(charger.power_kw);
        let minutes_needed = deficit / rate;
        if minutes_needed > minutes as f32 + CHARGING_SAFETY_BUFFER_MINUTES {
            let projected = (vehicle.soc + rate * minutes as f32).min(100.0);
            let candidates = find_swap_candidates(vehicles, vehicle, duty, schedule);
            let mut actions = swap_actions(vehicle, &candidates, duty);
            let no_swap = actions.is_empty();
            actions.push(
                ProposedAction::new(
                    "action-boost",
                    "Boost Charging Priority",
                    format!("Increase {} power allocation if grid allows.", charger.id),
                    ActionType::Prioritize,
                    BOOST_CONFIDENCE,
                )
                .recommended(no_swap),
            );
            actions.push(ProposedAction::new(
                "action-accept",
                "Accept Partial Charge",
                "Depart at projected SoC. Route may require opportunity charging.",
                ActionType::Acknowledge,
                ACCEPT_PARTIAL_CONFIDENCE,
            ));

            let mut alert = Alert::new(
                ids.next_id(),
                Severity::Warning,
                AlertCategory::SocDeviation,
                duty.depot_id.clone(),
                now,
            );
            alert.title = "Charging Behind Schedule".to_string();
            alert.message = format!(
                "{} projected to reach {projected:.0}% by {departure}. Needs {}%.",
                vehicle.id, duty.required_soc,
            );
            alert.vehicle_id = Some(vehicle.id.clone());
            alert.charger_id = Some(charger.id.clone());
            alert.duty_id = Some(duty.id.clone());
            alert.deadline = Some(deadline);
            alert.impact_description = format!(
                "Charging at {}kW. Estimated {:.0} minutes short.",
                charger.power_kw,
                minutes_needed - minutes as f32,
            );
            alert.affected_services = 1;
            alert.penalty_risk = SOC_DEVIATION_PENALTY;
            alert.confidence_score = top_confidence(&actions);
            alert.proposed_actions = actions;
            alerts.push(alert);
        }
    }
}

fn grid_check<G: AlertIdGenerator + ?Sized>(
    depot: &Depot,
    now: NaiveDateTime,
    ids: &mut G,
) -> Option<Alert> {
    let load_percent = depot.load_percent(now);
    if load_percent <= GRID_WARNING_PERCENT {
        return None;
    }

    let critical = load_percent > GRID_CRITICAL_PERCENT;
    let allowed_kw = depot.effective_capacity_kw(now);
    let mut alert = Alert::new(
        ids.next_id(),
        if critical {
            Severity::Critical
        } else {
            Severity::Warning
        },
        AlertCategory::GridConstraint,
        depot.id.clone(),
        now,
    );
    alert.title = if critical {
        "Grid Capacity Critical"
    } else {
        "Grid Load High"
    }
    .to_string();
    alert.message = format!(
        "{} at {load_percent:.0}% of allowed capacity ({:.0}kW / {allowed_kw:.0}kW).",
        depot.name, depot.current_load_kw,
    );
    alert.impact_description = depot.active_constraint(now).map_or_else(
        || "Approaching maximum grid connection capacity.".to_string(),
        |c| format!("Constraint active: {}", c.description),
    );
    alert.penalty_risk = if critical {
        GRID_CRITICAL_PENALTY
    } else {
        GRID_WARNING_PENALTY
    };
    alert.proposed_actions = vec![
        ProposedAction::new(
            "action-reduce",
            "Reduce Charging Load",
            "Temporarily reduce power to non-priority vehicles.",
            ActionType::Prioritize,
            LOAD_SHED_CONFIDENCE,
        )
        .with_savings(LOAD_SHED_SAVINGS)
        .recommended(true),
        ProposedAction::new(
            "action-monitor",
            "Monitor Only",
            "Continue monitoring. Alert again if 95% is exceeded.",
            ActionType::Acknowledge,
            MONITOR_CONFIDENCE,
        ),
    ];
    alert.confidence_score = LOAD_SHED_CONFIDENCE;
    Some(alert)
}

fn maintenance_check<G: AlertIdGenerator + ?Sized>(
    vehicle: &Vehicle,
    vehicles: &[Vehicle],
    schedule: &[ScheduledDuty],
    now: NaiveDateTime,
    ids: &mut G,
) -> Option<Alert> {
    if !vehicle.service_overdue() {
        return None;
    }
    let duty_id = vehicle.assigned_duty.as_deref()?;
    let duty = schedule.iter().find(|d| d.id == duty_id)?;
    if duty.status == DutyStatus::Departed {
        return None;
    }

    let candidates = find_swap_candidates(vehicles, vehicle, duty, schedule);
    let mut actions = swap_actions(vehicle, &candidates, duty);
    if actions.is_empty() {
        actions.push(
            ProposedAction::new(
                "action-replace",
                "Assign Reserve Vehicle",
                "Replace with an available maintenance-clear vehicle.",
                ActionType::Swap,
                RESERVE_CONFIDENCE,
            )
            .with_vehicles(vehicle.id.clone(), None)
            .recommended(true),
        );
    }
    actions.push(ProposedAction::new(
        "action-clear",
        "Clear for Service",
        "Engineering confirms vehicle safe for one more duty.",
        ActionType::Acknowledge,
        CLEAR_FOR_SERVICE_CONFIDENCE,
    ));

    let mut alert = Alert::new(
        ids.next_id(),
        Severity::Warning,
        AlertCategory::Maintenance,
        vehicle.depot_id.clone(),
        now,
    );
    alert.title = "Maintenance Overdue".to_string();
    alert.message = format!(
        "{} has overdue maintenance but is assigned to {} at {}.",
        vehicle.id,
        duty.id,
        duty.departure_time.format("%H:%M"),
    );
    alert.vehicle_id = Some(vehicle.id.clone());
    alert.duty_id = Some(duty.id.clone());
    alert.impact_description =
        "Vehicle may not be safe for service. Consider replacement.".to_string();
    alert.affected_services = 1;
    alert.confidence_score = top_confidence(&actions);
    alert.proposed_actions = actions;
    Some(alert)
}

/// Confidence of the recommended action, or 0 when nothing is recommended.
fn top_confidence(actions: &[ProposedAction]) -> u8 {
    actions
        .iter()
        .find(|a| a.is_recommended)
        .map_or(0, |a| a.confidence)
}
