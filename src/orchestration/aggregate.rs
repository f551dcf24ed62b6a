//! Merging a fresh engine pass into the live alert set.

use std::collections::HashSet;

use super::alert::Alert;

/// Result of [`merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Merge {
    /// Carried-forward unresolved alerts followed by genuinely new ones.
    pub live: Vec<Alert>,
    /// Previously live alerts that had been resolved.
    pub retired: Vec<Alert>,
    /// Number of fresh alerts admitted.
    pub added: usize,
}

/// Merges `fresh` into `previous`.
///
/// Unresolved alerts are carried forward unchanged. A fresh alert is admitted
/// only if no live alert shares its [`Alert::dedup_key`]. Fresh alerts are
/// not checked against each other, so two depots raising a grid alert in the
/// same pass are both admitted. Resolved alerts leave the live set.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use depot_orchestrator::orchestration::aggregate::merge;
/// use depot_orchestrator::orchestration::{Alert, AlertCategory, Severity};
///
/// let ts = NaiveDate::from_ymd_opt(2025, 1, 15)
///     .and_then(|d| d.and_hms_opt(5, 0, 0))
///     .expect("valid timestamp");
/// let grid = |id: &str| Alert::new(id, Severity::Warning, AlertCategory::GridConstraint, "central", ts);
///
/// let first = merge(Vec::new(), vec![grid("ALERT-1")]);
/// let second = merge(first.live, vec![grid("ALERT-2")]);
/// assert_eq!(second.live.len(), 1);
/// assert_eq!(second.live[0].id, "ALERT-1");
/// ```
pub fn merge(previous: Vec<Alert>, fresh: Vec<Alert>) -> Merge {
    let (retired, mut live): (Vec<Alert>, Vec<Alert>) =
        previous.into_iter().partition(Alert::is_resolved);

    let keys: HashSet<String> = live.iter().map(Alert::dedup_key).collect();
    let carried = live.len();
    live.extend(fresh.into_iter().filter(|a| !keys.contains(&a.dedup_key())));

    Merge {
        added: live.len() - carried,
        live,
        retired,
    }
}
