//! Batch lifecycle manager
//!
//! Validates submissions and enforces the legal status transitions:
//!
//! ```text
//! (none) --submit--> PendingApproval --begin_settlement--> Processing
//! ```
//!
//! `begin_settlement` is the pipeline's single admission-control point: the
//! compare-and-set in the store guarantees at most one concurrent settlement
//! per batch.

use crate::audit::AuditRecorder;
use crate::{Error, Result};
use batch_store::{
    ActivityAction, ActivityEvent, Actor, Batch, BatchStatus, ItemStatus, LineItem, LineItemDraft,
    Storage,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Batch lifecycle manager
pub struct LifecycleManager {
    store: Arc<Storage>,
    audit: Arc<dyn AuditRecorder>,
}

impl LifecycleManager {
    /// Create new manager
    pub fn new(store: Arc<Storage>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { store, audit }
    }

    /// Submit a new batch
    ///
    /// Sole creation path for a batch. Rejected submissions persist nothing.
    pub async fn submit(
        &self,
        actor: &Actor,
        source_label: &str,
        drafts: Vec<LineItemDraft>,
        note: Option<String>,
    ) -> Result<Uuid> {
        validate_drafts(&drafts)?;

        let batch_id = Uuid::new_v4();
        let now = Utc::now();
        let items: Vec<LineItem> = drafts
            .into_iter()
            .enumerate()
            .map(|(seq, draft)| LineItem {
                id: Uuid::now_v7(),
                batch_id,
                seq: seq as u32,
                payee_name: draft.payee_name,
                payee_bank: draft.payee_bank,
                payee_account: draft.payee_account,
                amount: draft.amount,
                status: ItemStatus::Pending,
            })
            .collect();

        let batch = Batch {
            id: batch_id,
            submitter_id: actor.id.clone(),
            submitter_label: actor.label.clone(),
            source_label: source_label.to_string(),
            line_count: items.len() as u32,
            total_amount: items.iter().map(|i| i.amount).sum(),
            created_at: now,
            updated_at: now,
            status: BatchStatus::PendingApproval,
            submitter_note: note,
            reviewer_note: None,
        };

        self.store.put_batch_atomic(&batch, &items)?;

        tracing::info!(
            batch_id = %batch_id,
            submitter = %actor.id,
            line_count = batch.line_count,
            total_amount = %batch.total_amount,
            "Batch submitted"
        );

        self.audit
            .record(ActivityEvent::new(
                actor,
                ActivityAction::Submission,
                format!(
                    "Submitted '{}' with {} records.",
                    batch.source_label, batch.line_count
                ),
            ))
            .await?;

        Ok(batch_id)
    }

    /// Overwrite the reviewer note; allowed in any state
    pub async fn set_reviewer_note(
        &self,
        batch_id: Uuid,
        note: impl Into<String>,
        actor: &Actor,
    ) -> Result<()> {
        let mut batch = self.store.get_batch(batch_id)?;
        batch.reviewer_note = Some(note.into());
        self.store.update_batch(&batch)?;

        self.audit
            .record(ActivityEvent::new(
                actor,
                ActivityAction::Review,
                format!("Updated reviewer note on '{}'.", batch.source_label),
            ))
            .await?;

        Ok(())
    }

    /// Admit a batch into settlement
    ///
    /// Compare-and-set `PendingApproval -> Processing`. Of N racing callers
    /// exactly one succeeds; the rest observe `Error::InvalidState`. Returns
    /// the updated batch as the settlement engine's handle.
    pub fn begin_settlement(&self, batch_id: Uuid, actor: &Actor) -> Result<Batch> {
        let batch = self.store.transition_batch(
            batch_id,
            BatchStatus::PendingApproval,
            BatchStatus::Processing,
        )?;

        tracing::info!(batch_id = %batch_id, reviewer = %actor.id, "Settlement admitted");

        Ok(batch)
    }
}

fn validate_drafts(drafts: &[LineItemDraft]) -> Result<()> {
    if drafts.is_empty() {
        return Err(Error::Validation(
            "batch contains no line items".to_string(),
        ));
    }

    for (seq, draft) in drafts.iter().enumerate() {
        if draft.amount <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "line {}: amount must be positive, got {}",
                seq, draft.amount
            )));
        }
        if draft.payee_name.trim().is_empty() {
            return Err(Error::Validation(format!("line {}: empty payee name", seq)));
        }
        if draft.payee_bank.trim().is_empty() {
            return Err(Error::Validation(format!("line {}: empty payee bank", seq)));
        }
        if draft.payee_account.trim().is_empty() {
            return Err(Error::Validation(format!(
                "line {}: empty payee account",
                seq
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::StoreAuditRecorder;
    use batch_store::{ActorRole, Config};
    use tempfile::TempDir;

    fn test_manager() -> (LifecycleManager, Arc<Storage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        let store = Arc::new(Storage::open(&config).unwrap());
        let audit = Arc::new(StoreAuditRecorder::new(store.clone()));
        (
            LifecycleManager::new(store.clone(), audit),
            store,
            temp_dir,
        )
    }

    fn submitter() -> Actor {
        Actor::new("coop-1", "Northern Cooperative", ActorRole::Submitter)
    }

    fn reviewer() -> Actor {
        Actor::new("admin-1", "Payments Desk", ActorRole::Reviewer)
    }

    fn drafts(amounts: &[i64]) -> Vec<LineItemDraft> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, cents)| {
                LineItemDraft::new(
                    format!("Payee {}", i),
                    "CRDB",
                    format!("0152{:06}", i),
                    Decimal::new(*cents, 2),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_submit_totals_and_counts() {
        let (manager, store, _temp) = test_manager();

        let batch_id = manager
            .submit(&submitter(), "payroll.csv", drafts(&[100000, 250000, 75000]), None)
            .await
            .unwrap();

        let batch = store.get_batch(batch_id).unwrap();
        assert_eq!(batch.status, BatchStatus::PendingApproval);
        assert_eq!(batch.line_count, 3);
        assert_eq!(batch.total_amount, Decimal::new(425000, 2));

        let items = store.get_line_items(batch_id).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.status == ItemStatus::Pending));
        let item_sum: Decimal = items.iter().map(|i| i.amount).sum();
        assert_eq!(item_sum, batch.total_amount);
    }

    #[tokio::test]
    async fn test_submit_records_activity() {
        let (manager, store, _temp) = test_manager();

        manager
            .submit(&submitter(), "payroll.csv", drafts(&[1000]), None)
            .await
            .unwrap();

        let events = store.list_activity().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, ActivityAction::Submission);
        assert!(events[0].details.contains("payroll.csv"));
    }

    #[tokio::test]
    async fn test_submit_empty_persists_nothing() {
        let (manager, store, _temp) = test_manager();

        let err = manager
            .submit(&submitter(), "empty.csv", vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.batch_count().unwrap(), 0);
        assert!(store.list_activity().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_amount() {
        let (manager, store, _temp) = test_manager();

        let mut bad = drafts(&[1000, 2000]);
        bad[1].amount = Decimal::ZERO;
        let err = manager
            .submit(&submitter(), "payroll.csv", bad, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.batch_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_payee_fields() {
        let (manager, _store, _temp) = test_manager();

        let mut bad = drafts(&[1000]);
        bad[0].payee_account = "   ".to_string();
        let err = manager
            .submit(&submitter(), "payroll.csv", bad, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_reviewer_note_any_state() {
        let (manager, store, _temp) = test_manager();

        let batch_id = manager
            .submit(&submitter(), "payroll.csv", drafts(&[1000]), None)
            .await
            .unwrap();

        manager
            .set_reviewer_note(batch_id, "first pass", &reviewer())
            .await
            .unwrap();
        assert_eq!(
            store.get_batch(batch_id).unwrap().reviewer_note.as_deref(),
            Some("first pass")
        );

        // Still writable after the batch has moved on
        manager.begin_settlement(batch_id, &reviewer()).unwrap();
        manager
            .set_reviewer_note(batch_id, "second pass", &reviewer())
            .await
            .unwrap();
        assert_eq!(
            store.get_batch(batch_id).unwrap().reviewer_note.as_deref(),
            Some("second pass")
        );
        // Status untouched by note edits
        assert_eq!(
            store.get_batch(batch_id).unwrap().status,
            BatchStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_reviewer_note_unknown_batch() {
        let (manager, _store, _temp) = test_manager();
        let err = manager
            .set_reviewer_note(Uuid::new_v4(), "note", &reviewer())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_begin_settlement_single_winner() {
        let (manager, store, _temp) = test_manager();

        let batch_id = manager
            .submit(&submitter(), "payroll.csv", drafts(&[1000]), None)
            .await
            .unwrap();

        let handle = manager.begin_settlement(batch_id, &reviewer()).unwrap();
        assert_eq!(handle.status, BatchStatus::Processing);

        let err = manager.begin_settlement(batch_id, &reviewer()).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(
            store.get_batch(batch_id).unwrap().status,
            BatchStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_begin_settlement_race() {
        let (manager, store, _temp) = test_manager();
        let manager = Arc::new(manager);

        let batch_id = manager
            .submit(&submitter(), "payroll.csv", drafts(&[1000]), None)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.begin_settlement(batch_id, &reviewer()).is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(
            store.get_batch(batch_id).unwrap().status,
            BatchStatus::Processing
        );
    }
}
