//! Solver output types.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Warnings and errors reach the user-facing notification sink; info does not.
    pub fn is_notifiable(self) -> bool {
        matches!(self, Severity::Warning | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic tied to the model it was computed from. `id` is stable across
/// recomputes for as long as the condition persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

impl Alert {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            detail: detail.into(),
        }
    }

    pub fn info(id: impl Into<String>, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(id, Severity::Info, title, detail)
    }

    pub fn warning(id: impl Into<String>, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(id, Severity::Warning, title, detail)
    }

    pub fn error(id: impl Into<String>, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(id, Severity::Error, title, detail)
    }
}

/// System-level results. SI: m, Pa, N/m³, W.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydraulicResults {
    pub total_dynamic_head: f64,
    pub energy_balance: f64,
    pub specific_weight: f64,
    pub suction_pressure: f64,
    pub discharge_pressure: f64,
    #[serde(default)]
    pub pipes: Vec<PipeResult>,
}

impl HydraulicResults {
    pub fn pipe(&self, pipe_id: &str) -> Option<&PipeResult> {
        self.pipes.iter().find(|p| p.pipe_id == pipe_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeResult {
    pub pipe_id: String,
    pub velocity: f64,
    pub reynolds: f64,
    pub friction_factor: f64,
    /// Friction plus minor losses, m of fluid.
    pub head_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Computation {
    pub results: HydraulicResults,
    pub alerts: Vec<Alert>,
}

impl Computation {
    pub fn alert(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn has_errors(&self) -> bool {
        self.alerts.iter().any(|a| a.severity == Severity::Error)
    }
}
