//! Stuck-batch reconciliation
//!
//! A storage failure between admission and finalization leaves a batch in
//! `Processing`. The recovery manager finds batches that have sat there past
//! a timeout and applies the configured reconciliation policy: re-enter
//! settlement (safe, settlement is idempotent over resolved items) or revert
//! to `PendingApproval` for manual retry.

use crate::config::{RecoveryConfig, RecoveryMode};
use crate::engine::SettlementEngine;
use crate::Result;
use batch_store::{Actor, BatchStatus, Storage};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Recovery manager
pub struct RecoveryManager {
    store: Arc<Storage>,
    engine: SettlementEngine,
    config: RecoveryConfig,
}

impl RecoveryManager {
    /// Create new manager
    pub fn new(store: Arc<Storage>, engine: SettlementEngine, config: RecoveryConfig) -> Self {
        Self {
            store,
            engine,
            config,
        }
    }

    /// Reconcile every stuck batch; returns the ids acted on
    pub async fn recover_stuck(&self) -> Result<Vec<Uuid>> {
        let cutoff = Utc::now() - Duration::seconds(self.config.stuck_after_seconds as i64);
        let actor = Actor::system();

        let mut recovered = Vec::new();
        for batch in self.store.list_batches_by_status(BatchStatus::Processing)? {
            if batch.updated_at >= cutoff {
                continue;
            }

            tracing::warn!(
                batch_id = %batch.id,
                updated_at = %batch.updated_at,
                mode = ?self.config.mode,
                "Recovering stuck batch"
            );

            match self.config.mode {
                RecoveryMode::Resume => {
                    self.engine.settle(batch.id, &actor).await?;
                }
                RecoveryMode::Revert => {
                    self.store.transition_batch(
                        batch.id,
                        BatchStatus::Processing,
                        BatchStatus::PendingApproval,
                    )?;
                }
            }
            recovered.push(batch.id);
        }

        Ok(recovered)
    }
}
