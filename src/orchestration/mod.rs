//! Risk detection and remediation.
//!
//! [`engine::evaluate`] scans the fleet and proposes actions,
//! [`aggregate::merge`] folds a pass into the live alert set and
//! [`executor::apply_resolution`] carries out the operator's choice.

pub mod aggregate;
/// Alert and proposed-action types.
pub mod alert;
pub mod engine;
pub mod executor;
pub mod ids;
/// Swap-candidate search and confidence scoring.
pub mod swap;

use tracing::debug;

use crate::sim::state::FleetState;

pub use alert::{ActionType, Alert, AlertCategory, ProposedAction, Resolution, Severity};
pub use engine::evaluate;
pub use executor::{apply_resolution, resolve};
pub use ids::{AlertIdGenerator, SequentialIds};

/// Upper bound for every confidence value.
pub const MAX_CONFIDENCE: u8 = 99;

/// Runs one orchestration pass over `state` and merges it into the live set.
///
/// Alerts that were resolved since the last pass move to the resolved log.
pub fn refresh_alerts<G: AlertIdGenerator + ?Sized>(state: &mut FleetState, ids: &mut G) {
    let fresh = evaluate(
        &state.vehicles,
        &state.chargers,
        &state.schedule,
        &state.depots,
        state.now(),
        ids,
    );
    let merged = aggregate::merge(std::mem::take(&mut state.alerts), fresh);
    debug!(
        live = merged.live.len(),
        added = merged.added,
        retired = merged.retired.len(),
        "alerts refreshed"
    );
    state.alerts = merged.live;
    for alert in merged.retired {
        state.record_resolved(alert);
    }
}
