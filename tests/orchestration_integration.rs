//! Integration tests for risk detection, alert merging and resolution.

mod common;

use depot_orchestrator::fleet::{Depot, DutyStatus, VehicleStatus};
use depot_orchestrator::orchestration::{
    self, ActionType, AlertCategory, MAX_CONFIDENCE, SequentialIds, Severity, evaluate, resolve,
};
use depot_orchestrator::sim::links::check_links;
use depot_orchestrator::sim::Simulation;

#[test]
fn charger_fault_raises_critical_alert_with_swap() {
    common::init_tracing();
    let state = common::charger_fault_fleet();
    let alerts = evaluate(
        &state.vehicles,
        &state.chargers,
        &state.schedule,
        &state.depots,
        state.now(),
        &mut SequentialIds::default(),
    );

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.category, AlertCategory::ChargingFault);
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.deadline, Some(common::at(6, 15)));
    assert_eq!(alert.penalty_risk, 2400);
    assert_eq!(alert.charger_id.as_deref(), Some("CH-01"));
    assert!(alert.message.contains("communication-timeout"));

    let recommended = alert.recommended_action().expect("a recommended action");
    assert_eq!(recommended.action_type, ActionType::Swap);
    assert_eq!(recommended.target_vehicle_id.as_deref(), Some("BUS-105"));
    assert_eq!(alert.confidence_score, recommended.confidence);
}

#[test]
fn grid_overload_is_critical() {
    let mut state = common::empty_depot(12, 0, 1);
    state.depots[0].current_load_kw = 960.0;
    let alerts = evaluate(
        &state.vehicles,
        &state.chargers,
        &state.schedule,
        &state.depots,
        state.now(),
        &mut SequentialIds::default(),
    );

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, AlertCategory::GridConstraint);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(alerts[0].penalty_risk, 5000);
    assert_eq!(
        alerts[0].recommended_action().map(|a| a.id.as_str()),
        Some("action-reduce")
    );
}

#[test]
fn grid_constraint_window_tightens_capacity() {
    let mut state = common::empty_depot(17, 0, 1);
    state.depots = vec![Depot::new("north", "North Depot", 1.8).with_constraint(
        depot_orchestrator::fleet::GridConstraint {
            start_hour: 16,
            end_hour: 19,
            max_capacity_percent: 50.0,
            description: "Evening peak".to_string(),
            months: None,
        },
    )];
    state.depots[0].current_load_kw = 800.0;

    let mut ids = SequentialIds::default();
    let inside = evaluate(&[], &[], &[], &state.depots, common::at(17, 0), &mut ids);
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].severity, Severity::Warning);
    assert!(inside[0].impact_description.contains("Evening peak"));

    let outside = evaluate(&[], &[], &[], &state.depots, common::at(19, 0), &mut ids);
    assert!(outside.is_empty());
}

#[test]
fn two_overloaded_depots_each_keep_a_grid_alert() {
    let mut state = common::empty_depot(12, 0, 1);
    state.depots.push(Depot::new("north", "North Depot", 1.0));
    state.depots[0].current_load_kw = 960.0;
    state.depots[1].current_load_kw = 990.0;
    let mut ids = SequentialIds::default();

    orchestration::refresh_alerts(&mut state, &mut ids);
    let depots: Vec<&str> = state.alerts.iter().map(|a| a.depot_id.as_str()).collect();
    assert_eq!(depots, ["central", "north"]);
    assert!(state.alerts.iter().all(|a| a.category == AlertCategory::GridConstraint));

    orchestration::refresh_alerts(&mut state, &mut ids);
    assert_eq!(state.alerts.len(), 2);
    common::assert_unique_keys(&state.alerts);
}

#[test]
fn resolving_unknown_alert_leaves_state_equal() {
    let mut state = common::charger_fault_fleet();
    let mut ids = SequentialIds::default();
    orchestration::refresh_alerts(&mut state, &mut ids);

    let unknown_alert = resolve("ALERT-999", "action-swap-0", &state, &mut ids);
    assert_eq!(unknown_alert, state);

    let alert_id = state.alerts[0].id.clone();
    let unknown_action = resolve(&alert_id, "action-teleport", &state, &mut ids);
    assert_eq!(unknown_action, state);
}

#[test]
fn swap_keeps_links_symmetric_and_clears_the_risk() {
    let mut state = common::charger_fault_fleet();
    let mut ids = SequentialIds::default();
    orchestration::refresh_alerts(&mut state, &mut ids);
    let alert_id = state.alerts[0].id.clone();

    let next = resolve(&alert_id, "action-swap-0", &state, &mut ids);

    let duty = next.duty("BLOCK-001").expect("duty exists");
    assert_eq!(duty.vehicle_id, "BUS-105");
    assert_eq!(duty.status, DutyStatus::Scheduled);
    assert_eq!(
        next.vehicle("BUS-105").and_then(|v| v.assigned_duty.as_deref()),
        Some("BLOCK-001")
    );
    assert_eq!(
        next.vehicle("BUS-101").and_then(|v| v.assigned_duty.as_deref()),
        None
    );
    assert!(check_links(&next).is_empty());

    assert!(next.alerts.iter().all(|a| a.category != AlertCategory::ChargingFault));
    assert_eq!(next.resolved_log.len(), 1);
    let resolution = next.resolved_log[0].resolution.as_ref().expect("resolved");
    assert_eq!(resolution.summary, "Swap with BUS-105");

    let fresh = evaluate(
        &next.vehicles,
        &next.chargers,
        &next.schedule,
        &next.depots,
        next.now(),
        &mut ids,
    );
    assert!(fresh.is_empty(), "swap should clear every risk: {fresh:?}");
}

#[test]
fn repeated_passes_do_not_duplicate_alerts() {
    let mut state = common::preset_state("central");
    let mut ids = SequentialIds::default();
    for _ in 0..5 {
        orchestration::refresh_alerts(&mut state, &mut ids);
        common::assert_unique_keys(&state.alerts);
    }
    assert_eq!(state.alerts.len(), 2);
    assert_eq!(state.alerts[0].id, "ALERT-1");
}

#[test]
fn central_preset_opens_with_fault_and_maintenance() {
    let sim = Simulation::seeded(common::preset_state("central"), 42);
    let alerts = &sim.state().alerts;
    assert_eq!(alerts.len(), 2);

    let fault = &alerts[0];
    assert_eq!(fault.category, AlertCategory::ChargingFault);
    assert_eq!(fault.vehicle_id.as_deref(), Some("BUS-101"));
    let targets: Vec<&str> = fault
        .proposed_actions
        .iter()
        .filter_map(|a| a.target_vehicle_id.as_deref())
        .collect();
    assert_eq!(targets, ["BUS-105", "BUS-102", "BUS-104"]);

    let maintenance = &alerts[1];
    assert_eq!(maintenance.category, AlertCategory::Maintenance);
    assert_eq!(maintenance.vehicle_id.as_deref(), Some("BUS-104"));
    assert_eq!(
        maintenance
            .recommended_action()
            .and_then(|a| a.target_vehicle_id.as_deref()),
        Some("BUS-105")
    );
}

#[test]
fn confidence_values_stay_in_range() {
    let mut sim = Simulation::seeded(common::preset_state("morning_crisis"), 3);
    for _ in 0..240 {
        sim.tick();
        for alert in &sim.state().alerts {
            assert!(alert.confidence_score <= MAX_CONFIDENCE);
            assert!(alert.proposed_actions.iter().all(|a| a.confidence <= MAX_CONFIDENCE));
            assert!(
                alert.proposed_actions.iter().filter(|a| a.is_recommended).count() <= 1,
                "{} recommends more than one action",
                alert.id
            );
        }
    }
}

#[test]
fn alert_serializes_to_wire_shape() {
    let state = common::charger_fault_fleet();
    let alerts = evaluate(
        &state.vehicles,
        &state.chargers,
        &state.schedule,
        &state.depots,
        state.now(),
        &mut SequentialIds::default(),
    );
    let json = serde_json::to_value(&alerts[0]).expect("alert serializes");

    assert_eq!(json["id"], "ALERT-1");
    assert_eq!(json["category"], "charging-fault");
    assert_eq!(json["severity"], "Critical");
    assert_eq!(json["penalty_risk"], 2400);
    assert_eq!(json["proposed_actions"][0]["type"], "swap");
    assert_eq!(json["proposed_actions"][0]["target_vehicle_id"], "BUS-105");
    assert_eq!(json["proposed_actions"][1]["type"], "prioritize");
    assert!(json["resolution"].is_null());
}

#[test]
fn idle_vehicle_short_of_charge_is_flagged_near_departure() {
    let mut state = common::charger_fault_fleet();
    state.chargers.clear();
    if let Some(v) = state.vehicle_mut("BUS-101") {
        v.status = VehicleStatus::Idle;
        v.charger_id = None;
    }
    let mut ids = SequentialIds::default();

    let early = evaluate(&state.vehicles, &[], &state.schedule, &[], common::at(4, 0), &mut ids);
    assert!(early.is_empty());

    let late = evaluate(&state.vehicles, &[], &state.schedule, &[], common::at(5, 0), &mut ids);
    assert_eq!(late.len(), 1);
    assert_eq!(late[0].category, AlertCategory::PullOutRisk);
    assert_eq!(late[0].severity, Severity::Critical);
    assert_eq!(late[0].penalty_risk, 1800);
}

#[test]
fn evaluate_is_repeatable_apart_from_ids() {
    let state = common::preset_state("central");
    let pass = |prefix: &str| {
        evaluate(
            &state.vehicles,
            &state.chargers,
            &state.schedule,
            &state.depots,
            state.now(),
            &mut SequentialIds::with_prefix(prefix),
        )
    };
    let first = pass("A");
    let second = pass("B");
    assert_eq!(first[0].id, "A-1");
    assert_eq!(second[0].id, "B-1");
    assert_eq!(common::without_ids(&first), common::without_ids(&second));
}
