//! Payout Settlement Pipeline
//!
//! Batch submission, approval, and settlement for bulk payment instructions
//! from member organizations.
//!
//! # Architecture
//!
//! The pipeline moves a batch through a fixed state machine:
//!
//! 1. **Submission**: a validated batch and its line items persist as
//!    `PendingApproval`
//! 2. **Admission**: a reviewer's approval compare-and-sets the batch to
//!    `Processing` (at most one settlement per batch)
//! 3. **Settlement**: every pending item is decided once by a pluggable
//!    policy; results commit in a single atomic write
//! 4. **Archival**: the settlement record and completion notification are
//!    produced exactly once
//!
//! # Example
//!
//! ```no_run
//! use settlement::{Config, PayoutService};
//! use settlement::{Actor, ActorRole, LineItemDraft};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> settlement::Result<()> {
//!     let service = PayoutService::open(Config::default())?;
//!
//!     let coop = Actor::new("coop-1", "Northern Cooperative", ActorRole::Submitter);
//!     let desk = Actor::new("admin-1", "Payments Desk", ActorRole::Reviewer);
//!
//!     let drafts = vec![
//!         LineItemDraft::new("Asha Mwangi", "CRDB", "0152000001", Decimal::from(1000)),
//!     ];
//!     let batch_id = service.submit_batch(&coop, "payroll.csv", drafts, None).await?;
//!
//!     let result = service.approve_and_settle(batch_id, &desk).await?;
//!     println!("paid {} of {}", result.paid_count, result.resolved_count());
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod policy;
pub mod recovery;
pub mod service;
pub mod types;

// Re-exports
pub use config::{Config, PolicyConfig, RecoveryConfig, RecoveryMode};
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use lifecycle::LifecycleManager;
pub use notify::{NotificationEvent, NotificationSink, Severity};
pub use policy::{Outcome, SettlementPolicy, SimulatedRail};
pub use recovery::RecoveryManager;
pub use service::PayoutService;
pub use types::{Progress, SettlementResult};

// Store types consumed by callers of this crate
pub use batch_store::{
    ActivityAction, ActivityEvent, Actor, ActorId, ActorRole, Batch, BatchStatus, FailureReason,
    ItemStatus, LineItem, LineItemDraft, SettlementRecord,
};
