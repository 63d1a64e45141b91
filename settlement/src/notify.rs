//! Notification emitter
//!
//! Converts a settlement result into a delivery-agnostic event. The
//! transformation is total; delivery transport is the sink's concern.

use crate::types::SettlementResult;
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Every item paid
    Success,
    /// One or more items failed
    Warning,
}

/// One-shot message describing a completed settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Short headline
    pub headline: String,

    /// Human-readable summary
    pub body: String,

    /// Severity
    pub severity: Severity,
}

impl NotificationEvent {
    /// Build the event for a settlement result
    pub fn from_result(result: &SettlementResult) -> Self {
        let severity = if result.failed_count > 0 {
            Severity::Warning
        } else {
            Severity::Success
        };
        Self {
            headline: "Settlement complete".to_string(),
            body: format!(
                "{}: paid {}/{} payees ({} failed)",
                result.submitter_label,
                result.paid_count,
                result.resolved_count(),
                result.failed_count
            ),
            severity,
        }
    }
}

/// Receives one notification per completed settlement
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one event
    async fn deliver(&self, event: NotificationEvent) -> Result<()>;
}

/// Sink that delivers through structured logs
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn deliver(&self, event: NotificationEvent) -> Result<()> {
        tracing::info!(
            headline = %event.headline,
            severity = ?event.severity,
            "{}",
            event.body
        );
        Ok(())
    }
}

/// Sink that buffers events in memory, for tests and polling consumers
#[derive(Default)]
pub struct MemoryNotifier {
    events: Mutex<Vec<NotificationEvent>>,
}

impl MemoryNotifier {
    /// Create empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain buffered events
    pub fn take(&self) -> Vec<NotificationEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

#[async_trait]
impl NotificationSink for MemoryNotifier {
    async fn deliver(&self, event: NotificationEvent) -> Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}
