/// Simulated wall clock.
pub mod clock;
pub mod engine;
/// Scenario timeline events.
pub mod event;
pub mod kpi;
pub mod links;
/// Telemetry jitter sources.
pub mod noise;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use engine::Simulation;
pub use event::{EventEffect, ScenarioEvent};
pub use kpi::{DashboardStats, FleetStats, StatusCounts};
pub use links::LinkViolation;
pub use noise::{FixedNoise, NoiseSource, SeededNoise};
pub use state::FleetState;
pub use tick::tick;
