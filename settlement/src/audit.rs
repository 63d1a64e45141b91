//! Audit recorder seam
//!
//! The pipeline emits one structured activity event per mutating operation.
//! The default recorder appends to the store's activity log; consumers with
//! their own sink substitute their implementation.

use crate::Result;
use async_trait::async_trait;
use batch_store::{ActivityEvent, Storage};
use std::sync::Arc;

/// Receives structured activity events from the pipeline
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Record one event
    async fn record(&self, event: ActivityEvent) -> Result<()>;
}

/// Recorder appending to the store's activity log
pub struct StoreAuditRecorder {
    store: Arc<Storage>,
}

impl StoreAuditRecorder {
    /// Create recorder over the given store
    pub fn new(store: Arc<Storage>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditRecorder for StoreAuditRecorder {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        self.store.append_activity(&event)?;
        Ok(())
    }
}

/// Recorder that drops every event
pub struct NullAuditRecorder;

#[async_trait]
impl AuditRecorder for NullAuditRecorder {
    async fn record(&self, _event: ActivityEvent) -> Result<()> {
        Ok(())
    }
}
