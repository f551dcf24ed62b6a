//! Alert identity generation.

/// Supplies ids for newly raised alerts.
///
/// Injected into every orchestration pass so the engine itself holds no
/// counters. Any `FnMut() -> String` closure is a generator.
pub trait AlertIdGenerator {
    fn next_id(&mut self) -> String;
}

impl<F: FnMut() -> String> AlertIdGenerator for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Sequential `ALERT-<n>` ids, starting at 1.
///
/// # Examples
///
/// ```
/// use depot_orchestrator::orchestration::ids::{AlertIdGenerator, SequentialIds};
///
/// let mut ids = SequentialIds::default();
/// assert_eq!(ids.next_id(), "ALERT-1");
/// assert_eq!(ids.next_id(), "ALERT-2");
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    issued: u64,
}

impl SequentialIds {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::with_prefix("ALERT")
    }
}

impl AlertIdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("{}-{}", self.prefix, self.issued)
    }
}
