//! Exclusion records and the diagnostic emitted once per clone call.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExclusionReason {
    #[serde(rename = "event")]
    Event,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "symbol")]
    Symbol,
    #[serde(rename = "other-unclonable")]
    Other,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => write!(f, "event"),
            Self::Function => write!(f, "function"),
            Self::Symbol => write!(f, "symbol"),
            Self::Other => write!(f, "other-unclonable"),
        }
    }
}

/// One member left out of a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    /// Traversal path, segments joined with `" > "` (e.g. `nodes > 0 > onClick`).
    pub path: String,
    pub reason: ExclusionReason,
}

/// Summary of everything one clone call excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub total: usize,
    pub detalles: Vec<Exclusion>,
}

impl SanitizeReport {
    /// `None` when nothing was excluded.
    pub fn from_exclusions(detalles: Vec<Exclusion>) -> Option<Self> {
        if detalles.is_empty() {
            None
        } else {
            Some(Self {
                total: detalles.len(),
                detalles,
            })
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.detalles.iter().map(|e| e.path.as_str())
    }

    pub fn count(&self, reason: ExclusionReason) -> usize {
        self.detalles.iter().filter(|e| e.reason == reason).count()
    }
}

impl fmt::Display for SanitizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} excluded:", self.total)?;
        for (i, exclusion) in self.detalles.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{} ({})", exclusion.path, exclusion.reason)?;
        }
        Ok(())
    }
}

/// Receives the per-call diagnostic.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, report: &SanitizeReport);
}

/// Emits the diagnostic as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn emit(&self, report: &SanitizeReport) {
        tracing::warn!(
            target: "hydronet::sanitize",
            total = report.total,
            detalles = %report,
            "excluded non-serializable members while cloning"
        );
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    reports: Mutex<Vec<SanitizeReport>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<SanitizeReport> {
        self.reports
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn emit(&self, report: &SanitizeReport) {
        if let Ok(mut guard) = self.reports.lock() {
            guard.push(report.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_exclusions_produce_no_report() {
        assert!(SanitizeReport::from_exclusions(Vec::new()).is_none());
    }

    #[test]
    fn report_serializes_with_reason_tags() {
        let report = SanitizeReport::from_exclusions(vec![
            Exclusion {
                path: "nodes > 0 > onClick".into(),
                reason: ExclusionReason::Function,
            },
            Exclusion {
                path: "nodes > 1 > blob".into(),
                reason: ExclusionReason::Other,
            },
        ])
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["detalles"][0]["reason"], "function");
        assert_eq!(json["detalles"][1]["reason"], "other-unclonable");
    }

    #[test]
    fn display_lists_paths() {
        let report = SanitizeReport::from_exclusions(vec![Exclusion {
            path: "a > b".into(),
            reason: ExclusionReason::Event,
        }])
        .unwrap();
        assert_eq!(report.to_string(), "1 excluded: a > b (event)");
    }
}
