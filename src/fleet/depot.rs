use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A time-windowed cap on depot power draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConstraint {
    /// First hour of the window (inclusive).
    pub start_hour: u32,
    /// Last hour of the window (exclusive).
    pub end_hour: u32,
    /// Allowed share of the grid connection while active (%).
    pub max_capacity_percent: f32,
    #[serde(default)]
    pub description: String,
    /// Calendar months (1-12) the constraint applies in; every month when absent.
    #[serde(default)]
    pub months: Option<Vec<u32>>,
}

impl GridConstraint {
    /// Returns `true` when the constraint covers the given hour and month.
    pub fn applies_at(&self, hour: u32, month: u32) -> bool {
        let in_window = hour >= self.start_hour && hour < self.end_hour;
        let in_season = self
            .months
            .as_ref()
            .is_none_or(|months| months.contains(&month));
        in_window && in_season
    }
}

/// A bus depot and its grid connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Depot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    /// Grid connection capacity (MW).
    pub max_capacity_mw: f32,
    /// Load drawn by active chargers (kW), recomputed every tick.
    #[serde(default)]
    pub current_load_kw: f32,
    /// Number of active chargers, recomputed every tick.
    #[serde(default)]
    pub active_chargers: usize,
    #[serde(default)]
    pub constraints: Vec<GridConstraint>,
}

impl Depot {
    /// Creates an unconstrained depot.
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_capacity_mw: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: String::new(),
            lat: 0.0,
            lng: 0.0,
            max_capacity_mw,
            current_load_kw: 0.0,
            active_chargers: 0,
            constraints: Vec::new(),
        }
    }

    /// Adds a grid constraint.
    pub fn with_constraint(mut self, constraint: GridConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Grid connection capacity in kW.
    pub fn max_capacity_kw(&self) -> f32 {
        self.max_capacity_mw * 1000.0
    }

    /// The most restrictive constraint active at `now`, if any.
    pub fn active_constraint(&self, now: NaiveDateTime) -> Option<&GridConstraint> {
        self.constraints
            .iter()
            .filter(|c| c.applies_at(now.hour(), now.month()))
            .min_by(|a, b| a.max_capacity_percent.total_cmp(&b.max_capacity_percent))
    }

    /// Allowed capacity at `now` (kW) after applying the active constraint.
    pub fn effective_capacity_kw(&self, now: NaiveDateTime) -> f32 {
        let percent = self
            .active_constraint(now)
            .map_or(100.0, |c| c.max_capacity_percent);
        self.max_capacity_kw() * percent / 100.0
    }

    /// Current load as a share of the allowed capacity at `now` (%).
    ///
    /// A zero allowance (e.g. a no-charging window) reports any load as
    /// unbounded and no load as 0%.
    pub fn load_percent(&self, now: NaiveDateTime) -> f32 {
        let allowed = self.effective_capacity_kw(now);
        if allowed > 0.0 {
            self.current_load_kw / allowed * 100.0
        } else if self.current_load_kw > 0.0 {
            f32::INFINITY
        } else {
            0.0
        }
    }
}
