//! Imperative shell owning the fleet state.

use tracing::info;

use crate::orchestration::{self, AlertIdGenerator, SequentialIds};

use super::kpi::DashboardStats;
use super::noise::{NoiseSource, SeededNoise};
use super::state::FleetState;
use super::tick::advance;

/// Simulation engine owning the fleet state, its noise source and the alert
/// id generator.
///
/// Generic over `N: NoiseSource` and `G: AlertIdGenerator` for static
/// dispatch. Ticks, orchestration passes and resolutions are serialized
/// through `&mut self`.
pub struct Simulation<N: NoiseSource = SeededNoise, G: AlertIdGenerator = SequentialIds> {
    state: FleetState,
    noise: N,
    ids: G,
}

impl Simulation {
    /// Creates a simulation with seeded noise and sequential alert ids.
    pub fn seeded(state: FleetState, seed: u64) -> Self {
        Self::new(state, SeededNoise::new(seed), SequentialIds::default())
    }
}

impl<N: NoiseSource, G: AlertIdGenerator> Simulation<N, G> {
    /// Creates a simulation and runs an initial orchestration pass.
    ///
    /// # Arguments
    ///
    /// * `state` - Initial fleet state
    /// * `noise` - Telemetry jitter source
    /// * `ids` - Alert id generator
    pub fn new(state: FleetState, noise: N, ids: G) -> Self {
        let mut sim = Self { state, noise, ids };
        sim.run_orchestration();
        sim
    }

    /// Executes one tick followed by an orchestration pass.
    ///
    /// Returns `false` when the clock is paused; nothing changes then.
    pub fn tick(&mut self) -> bool {
        if !advance(&mut self.state, &mut self.noise) {
            return false;
        }
        self.run_orchestration();
        true
    }

    /// Executes up to `ticks` ticks and returns how many ran.
    pub fn run(&mut self, ticks: usize) -> usize {
        let mut ran = 0;
        for _ in 0..ticks {
            if !self.tick() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Re-evaluates the fleet and merges the result into the live alerts.
    pub fn run_orchestration(&mut self) {
        orchestration::refresh_alerts(&mut self.state, &mut self.ids);
    }

    /// Applies a proposed action; `false` if the alert or action is unknown.
    pub fn resolve(&mut self, alert_id: &str, action_id: &str) -> bool {
        orchestration::apply_resolution(&mut self.state, alert_id, action_id, &mut self.ids)
    }

    /// Applies the recommended action of every live alert, oldest first.
    ///
    /// Returns the number of alerts resolved. Alerts raised by the
    /// orchestration passes in between are left for the next call.
    pub fn resolve_recommended(&mut self) -> usize {
        let plan: Vec<(String, String)> = self
            .state
            .alerts
            .iter()
            .filter_map(|a| a.recommended_action().map(|r| (a.id.clone(), r.id.clone())))
            .collect();
        let mut resolved = 0;
        for (alert_id, action_id) in &plan {
            if self.resolve(alert_id, action_id) {
                resolved += 1;
            }
        }
        info!(resolved, planned = plan.len(), "recommended actions applied");
        resolved
    }

    pub fn stats(&self, depot_id: &str) -> DashboardStats {
        DashboardStats::for_depot(&self.state, depot_id)
    }

    pub fn state(&self) -> &FleetState {
        &self.state
    }

    /// Mutable access for operator controls such as speed and pause.
    pub fn state_mut(&mut self) -> &mut FleetState {
        &mut self.state
    }

    pub fn into_state(self) -> FleetState {
        self.state
    }
}
