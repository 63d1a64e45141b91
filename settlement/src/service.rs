//! Payout service facade
//!
//! Wires the store, lifecycle manager, settlement engine, policy, audit
//! recorder, and notification sink into the surface consumed by the UI/API
//! layer. Collaborators are injectable; the defaults persist audit events in
//! the store and deliver notifications through structured logs.

use crate::audit::{AuditRecorder, StoreAuditRecorder};
use crate::config::Config;
use crate::engine::SettlementEngine;
use crate::lifecycle::LifecycleManager;
use crate::notify::{NotificationSink, TracingNotifier};
use crate::policy::{SettlementPolicy, SimulatedRail};
use crate::recovery::RecoveryManager;
use crate::types::SettlementResult;
use crate::Result;
use batch_store::{
    ActivityEvent, Actor, ActorId, Batch, LineItem, LineItemDraft, SettlementRecord, Storage,
    StoreStats, SubmitterSummary,
};
use std::sync::Arc;
use uuid::Uuid;

/// Payout service
pub struct PayoutService {
    store: Arc<Storage>,
    policy: Arc<dyn SettlementPolicy>,
    notifier: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditRecorder>,
    config: Config,
}

impl PayoutService {
    /// Open the service with default collaborators
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(Storage::open(&config.store_config())?);
        let policy = Arc::new(SimulatedRail::from_config(&config.policy));
        let audit = Arc::new(StoreAuditRecorder::new(store.clone()));

        Ok(Self {
            store,
            policy,
            notifier: Arc::new(TracingNotifier),
            audit,
            config,
        })
    }

    /// Replace the settlement policy
    pub fn with_policy(mut self, policy: Arc<dyn SettlementPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the notification sink
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the audit recorder
    pub fn with_audit(mut self, audit: Arc<dyn AuditRecorder>) -> Self {
        self.audit = audit;
        self
    }

    /// Direct store access for read-side consumers
    pub fn store(&self) -> Arc<Storage> {
        self.store.clone()
    }

    /// Settlement engine over this service's collaborators
    ///
    /// Exposed for callers that subscribe to settlement progress.
    pub fn engine(&self) -> SettlementEngine {
        SettlementEngine::new(
            self.store.clone(),
            self.policy.clone(),
            self.notifier.clone(),
            self.audit.clone(),
        )
    }

    /// Recovery manager for stuck batches
    pub fn recovery(&self) -> RecoveryManager {
        RecoveryManager::new(
            self.store.clone(),
            self.engine(),
            self.config.recovery.clone(),
        )
    }

    fn lifecycle(&self) -> LifecycleManager {
        LifecycleManager::new(self.store.clone(), self.audit.clone())
    }

    /// Submit a new batch of payment instructions
    pub async fn submit_batch(
        &self,
        actor: &Actor,
        source_label: &str,
        drafts: Vec<LineItemDraft>,
        note: Option<String>,
    ) -> Result<Uuid> {
        self.lifecycle().submit(actor, source_label, drafts, note).await
    }

    /// Attach or overwrite a reviewer note
    pub async fn review_batch(
        &self,
        batch_id: Uuid,
        actor: &Actor,
        note: impl Into<String>,
    ) -> Result<()> {
        self.lifecycle().set_reviewer_note(batch_id, note, actor).await
    }

    /// Approve a pending batch and settle it to completion
    pub async fn approve_and_settle(
        &self,
        batch_id: Uuid,
        actor: &Actor,
    ) -> Result<SettlementResult> {
        self.lifecycle().begin_settlement(batch_id, actor)?;
        self.engine().settle(batch_id, actor).await
    }

    /// Get a batch by ID
    pub fn get_batch(&self, batch_id: Uuid) -> Result<Batch> {
        Ok(self.store.get_batch(batch_id)?)
    }

    /// A batch's line items in submission order
    pub fn list_line_items(&self, batch_id: Uuid) -> Result<Vec<LineItem>> {
        self.store.get_batch(batch_id)?;
        Ok(self.store.get_line_items(batch_id)?)
    }

    /// Archival settlement history, newest first
    pub fn settlement_history(&self) -> Result<Vec<SettlementRecord>> {
        Ok(self.store.list_settlement_records()?)
    }

    /// Activity log, newest first
    pub fn activity_log(&self) -> Result<Vec<ActivityEvent>> {
        Ok(self.store.list_activity()?)
    }

    /// Aggregate store summary
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(self.store.stats()?)
    }

    /// Per-submitter totals and success rate
    pub fn submitter_summary(&self, submitter_id: &ActorId) -> Result<SubmitterSummary> {
        Ok(self.store.submitter_summary(submitter_id)?)
    }
}
