//! Depot-fleet orchestration engine for electric bus charging and dispatch.
//!
//! The crate advances a synthetic depot over simulated time, scans the
//! fleet for operational risks and proposes ranked remediation actions.

pub mod config;
/// Vehicles, chargers, depots, duties, routes and tariffs.
pub mod fleet;
/// Risk detection, alert aggregation and action execution.
pub mod orchestration;
/// Simulation clock, physical tick, scenario events and dashboard stats.
pub mod sim;
