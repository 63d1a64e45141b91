//! Settlement engine
//!
//! Converts every pending line item of an admitted batch into a terminal
//! status, exactly once, then finalizes the batch atomically.
//!
//! # Idempotence
//!
//! Settling an already-`Processed` batch is a soft no-op that returns the
//! previously computed aggregate; a terminal item is never re-decided. A
//! re-entered settlement (crash recovery) skips items that already resolved
//! and decides only the remainder.

use crate::audit::AuditRecorder;
use crate::notify::{NotificationEvent, NotificationSink};
use crate::policy::{Outcome, SettlementPolicy};
use crate::types::{Progress, SettlementResult};
use crate::{Error, Result};
use batch_store::{
    ActivityAction, ActivityEvent, Actor, Batch, BatchStatus, ItemStatus, SettlementRecord,
    Storage,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Settlement engine
pub struct SettlementEngine {
    /// Batch store
    store: Arc<Storage>,

    /// Per-item outcome policy
    policy: Arc<dyn SettlementPolicy>,

    /// Completion notification sink
    notifier: Arc<dyn NotificationSink>,

    /// Activity event sink
    audit: Arc<dyn AuditRecorder>,
}

impl SettlementEngine {
    /// Create new engine
    pub fn new(
        store: Arc<Storage>,
        policy: Arc<dyn SettlementPolicy>,
        notifier: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditRecorder>,
    ) -> Self {
        Self {
            store,
            policy,
            notifier,
            audit,
        }
    }

    /// Settle a batch without progress reporting
    pub async fn settle(&self, batch_id: Uuid, actor: &Actor) -> Result<SettlementResult> {
        let (progress, _) = watch::channel(Progress::default());
        self.settle_with_progress(batch_id, actor, &progress).await
    }

    /// Settle a batch, publishing progress after each resolved item
    ///
    /// Progress fractions are monotonically non-decreasing in [0, 1]; the
    /// final value corresponds to the terminal result.
    pub async fn settle_with_progress(
        &self,
        batch_id: Uuid,
        actor: &Actor,
        progress: &watch::Sender<Progress>,
    ) -> Result<SettlementResult> {
        let batch = self.store.get_batch(batch_id)?;

        if batch.status == BatchStatus::Processed {
            tracing::info!(batch_id = %batch_id, "Batch already processed, returning recorded aggregate");
            let result = self.replay_result(&batch)?;
            progress.send_replace(Progress {
                resolved: batch.line_count,
                total: batch.line_count,
            });
            return Ok(result);
        }

        if batch.status != BatchStatus::Processing {
            return Err(Error::InvalidState(format!(
                "batch {} is {}, settlement requires processing",
                batch_id, batch.status
            )));
        }

        let mut items = self.store.get_line_items(batch_id)?;
        let total = items.len() as u32;
        let mut paid_count = 0u32;
        let mut failed_count = 0u32;
        let mut resolved = 0u32;

        for item in items.iter_mut() {
            match item.status {
                // Already resolved by an interrupted run; never re-decided
                ItemStatus::Paid => paid_count += 1,
                ItemStatus::Failed(_) => failed_count += 1,
                ItemStatus::Pending => match self.policy.decide(item).await {
                    Outcome::Paid => {
                        item.status = ItemStatus::Paid;
                        paid_count += 1;
                    }
                    Outcome::Failed(reason) => {
                        item.status = ItemStatus::Failed(reason);
                        failed_count += 1;
                    }
                },
            }
            resolved += 1;
            progress.send_replace(Progress { resolved, total });
        }

        let record = SettlementRecord {
            batch_id,
            submitter_label: batch.submitter_label.clone(),
            source_label: batch.source_label.clone(),
            line_count: batch.line_count,
            total_amount: batch.total_amount,
            processed_at: Utc::now(),
        };

        self.store.finalize_settlement(batch_id, &items, &record)?;

        let result = SettlementResult {
            batch_id,
            submitter_label: batch.submitter_label.clone(),
            paid_count,
            failed_count,
            total_amount: batch.total_amount,
        };

        tracing::info!(
            batch_id = %batch_id,
            paid = paid_count,
            failed = failed_count,
            total_amount = %batch.total_amount,
            "Settlement complete"
        );

        // The settlement is durable at this point; sink failures must not
        // unwind it
        if let Err(e) = self
            .audit
            .record(ActivityEvent::new(
                actor,
                ActivityAction::Processed,
                format!(
                    "Processed '{}' for {}. Success: {}, Failed: {}.",
                    batch.source_label, batch.submitter_label, paid_count, failed_count
                ),
            ))
            .await
        {
            tracing::warn!(batch_id = %batch_id, error = %e, "Audit record failed after finalization");
        }

        if let Err(e) = self
            .notifier
            .deliver(NotificationEvent::from_result(&result))
            .await
        {
            tracing::warn!(batch_id = %batch_id, error = %e, "Notification delivery failed");
        }

        Ok(result)
    }

    /// Rebuild the aggregate of an already-processed batch
    fn replay_result(&self, batch: &Batch) -> Result<SettlementResult> {
        let items = self.store.get_line_items(batch.id)?;

        let mut paid_count = 0u32;
        let mut failed_count = 0u32;
        for item in &items {
            match item.status {
                ItemStatus::Paid => paid_count += 1,
                ItemStatus::Failed(_) => failed_count += 1,
                ItemStatus::Pending => {}
            }
        }

        Ok(SettlementResult {
            batch_id: batch.id,
            submitter_label: batch.submitter_label.clone(),
            paid_count,
            failed_count,
            total_amount: batch.total_amount,
        })
    }
}
