//! Alerts and the remediation actions proposed with them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// Fault and risk taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertCategory {
    PullOutRisk,
    ChargingFault,
    SocDeviation,
    GridConstraint,
    OpportunityCharging,
    Maintenance,
    DriverConflict,
    CrossDepot,
}

impl AlertCategory {
    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCategory::PullOutRisk => "pull-out-risk",
            AlertCategory::ChargingFault => "charging-fault",
            AlertCategory::SocDeviation => "soc-deviation",
            AlertCategory::GridConstraint => "grid-constraint",
            AlertCategory::OpportunityCharging => "opportunity-charging",
            AlertCategory::Maintenance => "maintenance",
            AlertCategory::DriverConflict => "driver-conflict",
            AlertCategory::CrossDepot => "cross-depot",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Swap,
    Reassign,
    Prioritize,
    Escalate,
    Acknowledge,
}

/// A remediation the operator can apply to resolve an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    /// Unique within its alert.
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Vehicle currently on the duty (swaps only).
    pub source_vehicle_id: Option<String>,
    /// Vehicle that takes the duty over (swaps only).
    pub target_vehicle_id: Option<String>,
    /// 0-99.
    pub confidence: u8,
    pub estimated_savings: Option<u32>,
    pub is_recommended: bool,
}

impl ProposedAction {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        action_type: ActionType,
        confidence: u8,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            action_type,
            source_vehicle_id: None,
            target_vehicle_id: None,
            confidence: confidence.min(super::MAX_CONFIDENCE),
            estimated_savings: None,
            is_recommended: false,
        }
    }

    pub fn recommended(mut self, is_recommended: bool) -> Self {
        self.is_recommended = is_recommended;
        self
    }

    pub fn with_vehicles(mut self, source: impl Into<String>, target: Option<String>) -> Self {
        self.source_vehicle_id = Some(source.into());
        self.target_vehicle_id = target;
        self
    }

    pub fn with_savings(mut self, savings: u32) -> Self {
        self.estimated_savings = Some(savings);
        self
    }
}

/// How and when an alert was closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved_at: NaiveDateTime,
    pub action_id: String,
    pub summary: String,
}

/// A detected operational risk with ranked remediation actions.
///
/// Alerts are rebuilt on every orchestration pass; `id` is only stable while
/// the alert stays live. Logical identity for de-duplication is
/// [`Alert::dedup_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,

    pub vehicle_id: Option<String>,
    pub charger_id: Option<String>,
    pub duty_id: Option<String>,
    pub depot_id: String,

    pub timestamp: NaiveDateTime,
    /// When the depot must have acted.
    pub deadline: Option<NaiveDateTime>,
    pub resolution: Option<Resolution>,

    pub impact_description: String,
    pub affected_services: u32,
    /// Estimated penalty if unresolved (currency units).
    pub penalty_risk: u32,

    pub proposed_actions: Vec<ProposedAction>,
    /// 0-99.
    pub confidence_score: u8,
}

impl Alert {
    /// Creates an unresolved alert with no subject references or actions.
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        category: AlertCategory,
        depot_id: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            category,
            title: String::new(),
            message: String::new(),
            vehicle_id: None,
            charger_id: None,
            duty_id: None,
            depot_id: depot_id.into(),
            timestamp,
            deadline: None,
            resolution: None,
            impact_description: String::new(),
            affected_services: 0,
            penalty_risk: 0,
            proposed_actions: Vec::new(),
            confidence_score: 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// De-duplication key: category plus the vehicle (or charger) it concerns.
    ///
    /// Alerts without a vehicle or charger share one key per category.
    pub fn dedup_key(&self) -> String {
        let subject = self
            .vehicle_id
            .as_deref()
            .or(self.charger_id.as_deref())
            .unwrap_or("");
        format!("{}:{subject}", self.category)
    }

    pub fn action(&self, action_id: &str) -> Option<&ProposedAction> {
        self.proposed_actions.iter().find(|a| a.id == action_id)
    }

    pub fn recommended_action(&self) -> Option<&ProposedAction> {
        self.proposed_actions.iter().find(|a| a.is_recommended)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} {} @{} | {} | risk={} conf={}% actions={}",
            self.severity,
            self.category,
            self.id,
            self.depot_id,
            self.message,
            self.penalty_risk,
            self.confidence_score,
            self.proposed_actions.len(),
        )?;
        if let Some(deadline) = self.deadline {
            write!(f, " deadline={}", deadline.format("%H:%M"))?;
        }
        Ok(())
    }
}
