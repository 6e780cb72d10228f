//! Forward newly raised alerts to a user-facing sink, once each.

use std::collections::BTreeSet;

use hn_hydraulics::{Alert, Severity};

pub trait NotificationSink {
    fn notify(&mut self, alert: &Alert);
}

/// Remembers the alert ids of the previous state.
///
/// An id that disappears is forgotten, so the same alert coming back later
/// notifies again.
#[derive(Debug, Clone, Default)]
pub struct AlertTracker {
    seen: BTreeSet<String>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many alerts were forwarded.
    pub fn observe(&mut self, alerts: &[Alert], sink: &mut dyn NotificationSink) -> usize {
        let mut forwarded = 0;
        for alert in alerts {
            if alert.severity.is_notifiable() && !self.seen.contains(&alert.id) {
                sink.notify(alert);
                forwarded += 1;
            }
        }
        self.seen = alerts.iter().map(|a| a.id.clone()).collect();
        forwarded
    }

    pub fn is_tracking(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    pub delivered: Vec<Alert>,
}

impl NotificationSink for CollectingSink {
    fn notify(&mut self, alert: &Alert) {
        self.delivered.push(alert.clone());
    }
}

/// Writes each notification as a tracing event on `hydronet::alerts`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, alert: &Alert) {
        match alert.severity {
            Severity::Error => {
                tracing::error!(target: "hydronet::alerts", id = %alert.id, title = %alert.title, "{}", alert.detail)
            }
            Severity::Warning => {
                tracing::warn!(target: "hydronet::alerts", id = %alert.id, title = %alert.title, "{}", alert.detail)
            }
            Severity::Info => {
                tracing::info!(target: "hydronet::alerts", id = %alert.id, title = %alert.title, "{}", alert.detail)
            }
        }
    }
}
