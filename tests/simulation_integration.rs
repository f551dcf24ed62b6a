//! Integration tests for the simulation tick, scenario events and presets.

mod common;

use depot_orchestrator::config::FleetConfig;
use depot_orchestrator::fleet::{Charger, ChargerStatus, DutyStatus, Vehicle, VehicleStatus};
use depot_orchestrator::orchestration::{AlertCategory, SequentialIds};
use depot_orchestrator::sim::links::check_links;
use depot_orchestrator::sim::{DashboardStats, FixedNoise, SeededNoise, Simulation, tick};

#[test]
fn tick_at_speed_four_charges_on_150kw() {
    let mut state = common::empty_depot(5, 30, 4);
    state.vehicles =
        vec![Vehicle::new("BUS-1", "central", 50.0, 90.0, VehicleStatus::Charging).with_charger("CH-1")];
    state.chargers =
        vec![Charger::new("CH-1", "central", 150.0, ChargerStatus::Active).with_vehicle("BUS-1")];

    let next = tick(&state, &mut FixedNoise(0.5), &mut SequentialIds::default());

    assert_eq!(next.now(), common::at(5, 34));
    assert_eq!(next.vehicles[0].soc, 53.3);
    assert_eq!(state.vehicles[0].soc, 50.0, "input state must be unchanged");
    assert!(next.chargers[0].power_delivery_kw > 0.0);
    assert_eq!(next.depots[0].active_chargers, 1);
}

#[test]
fn paused_tick_is_a_no_op() {
    let mut state = common::preset_state("central");
    state.clock.pause();
    let next = tick(&state, &mut FixedNoise(0.5), &mut SequentialIds::default());
    assert_eq!(next, state);
}

#[test]
fn seeded_runs_are_deterministic() {
    let run = |prefix: &str| {
        let mut sim = Simulation::new(
            common::preset_state("central"),
            SeededNoise::new(7),
            SequentialIds::with_prefix(prefix),
        );
        sim.run(90);
        sim.into_state()
    };
    let a = run("A");
    let b = run("B");

    assert_eq!(a.vehicles, b.vehicles);
    assert_eq!(a.chargers, b.chargers);
    assert_eq!(a.depots, b.depots);
    assert_eq!(common::without_ids(&a.alerts), common::without_ids(&b.alerts));
}

#[test]
fn soc_stays_bounded_and_moves_with_status() {
    common::init_tracing();
    let mut state = common::preset_state("central");
    state.clock.set_speed(5);
    let mut sim = Simulation::seeded(state, 11);

    for _ in 0..300 {
        let before = sim.state().vehicles.clone();
        assert!(sim.tick());
        for (old, new) in before.iter().zip(&sim.state().vehicles) {
            assert!((0.0..=100.0).contains(&new.soc), "{} soc {}", new.id, new.soc);
            if old.status == VehicleStatus::Charging && new.status == VehicleStatus::Charging {
                assert!(new.soc >= old.soc, "{} lost charge while charging", new.id);
            }
            if old.status == VehicleStatus::Driving && new.status == VehicleStatus::Driving {
                assert!(new.soc <= old.soc, "{} gained charge while driving", new.id);
            }
        }
        common::assert_unique_keys(&sim.state().alerts);
    }
    assert!(check_links(sim.state()).is_empty());
}

#[test]
fn morning_crisis_fault_fires_at_three() {
    let mut sim = FleetConfig::morning_crisis()
        .into_simulation()
        .expect("preset is valid");
    assert!(
        sim.state()
            .alerts
            .iter()
            .all(|a| a.category != AlertCategory::ChargingFault)
    );

    assert!(sim.tick());
    assert_eq!(sim.state().now(), common::at(3, 0));
    assert_eq!(
        sim.state().charger("CH-01").map(|c| c.status),
        Some(ChargerStatus::Faulted)
    );

    let fault = sim
        .state()
        .alerts
        .iter()
        .find(|a| a.category == AlertCategory::ChargingFault)
        .expect("charging fault raised");
    assert_eq!(fault.vehicle_id.as_deref(), Some("BUS-101"));
    assert_eq!(fault.deadline, Some(common::at(6, 15)));
    assert_eq!(
        fault
            .recommended_action()
            .and_then(|a| a.target_vehicle_id.as_deref()),
        Some("BUS-105")
    );

    // BUS-106 on a 50 kW unit cannot reach 95% by 06:45.
    assert!(sim.state().alerts.iter().any(|a| {
        a.category == AlertCategory::SocDeviation && a.vehicle_id.as_deref() == Some("BUS-106")
    }));
}

#[test]
fn morning_crisis_duties_depart_on_schedule() {
    let mut sim = FleetConfig::morning_crisis()
        .into_simulation()
        .expect("preset is valid");
    assert_eq!(sim.run(240), 240);
    assert_eq!(sim.state().now(), common::at(6, 59));
    assert!(
        sim.state()
            .schedule
            .iter()
            .all(|d| d.status == DutyStatus::Departed)
    );
    assert!(sim.state().events.iter().all(|e| e.fired));
}

#[test]
fn north_peak_grid_alert_follows_constraint_window() {
    let mut sim = FleetConfig::north_peak()
        .into_simulation()
        .expect("preset is valid");
    let grid_alerts = |sim: &Simulation| {
        sim.state()
            .alerts
            .iter()
            .filter(|a| a.category == AlertCategory::GridConstraint)
            .count()
    };

    sim.run(9);
    assert_eq!(sim.state().now(), common::at(15, 59));
    assert_eq!(grid_alerts(&sim), 0);

    sim.run(1);
    assert_eq!(grid_alerts(&sim), 1);
    let stats = sim.stats("north");
    assert_eq!(stats.max_load_kw, 1800.0);
    assert!(stats.current_load_kw > 800.0);

    sim.run(30);
    assert_eq!(sim.state().now(), common::at(16, 30));
    assert_eq!(
        sim.state().charger("CH-N03").map(|c| c.status),
        Some(ChargerStatus::Faulted)
    );
    assert!(sim.state().alerts.iter().any(|a| {
        a.category == AlertCategory::ChargingFault && a.vehicle_id.as_deref() == Some("BUS-203")
    }));

    sim.run(30);
    assert_eq!(
        sim.state().charger("CH-N03").map(|c| c.status),
        Some(ChargerStatus::Active)
    );
}

#[test]
fn every_preset_runs_cleanly() {
    for name in FleetConfig::PRESETS {
        let mut sim = FleetConfig::from_preset(name)
            .and_then(FleetConfig::into_simulation)
            .expect("preset is valid");
        assert_eq!(sim.run(120), 120, "preset {name}");
        assert!(check_links(sim.state()).is_empty(), "preset {name}");
        common::assert_unique_keys(&sim.state().alerts);

        let stats = DashboardStats::fleet(sim.state());
        assert!((0.0..=100.0).contains(&stats.fleet_readiness_pct));
        assert!((0.0..=100.0).contains(&stats.charger_uptime_pct));
    }
}

#[test]
fn resolving_recommendations_improves_readiness() {
    let mut sim = Simulation::seeded(common::preset_state("central"), 42);
    let before = sim.stats("central");
    assert_eq!(sim.resolve_recommended(), 2);
    let after = sim.stats("central");

    assert!(after.fleet_readiness_pct > before.fleet_readiness_pct);
    assert!(
        sim.state()
            .alerts
            .iter()
            .all(|a| a.category != AlertCategory::ChargingFault)
    );
    assert_eq!(sim.state().resolved_log.len(), 2);
}
