//! Payout Rail Batch Store
//!
//! Persistent CRUD and query surface over payment batches and their line
//! items, backed by RocksDB.
//!
//! # Architecture
//!
//! - **Typed entities**: statuses are closed enumerations, never free-form
//!   strings; money is exact `Decimal`
//! - **Atomic writes**: every multi-row mutation is a single `WriteBatch`
//! - **Serialized transitions**: batch status changes go through one
//!   compare-and-set section, the pipeline's only admission-control point
//!
//! # Invariants
//!
//! - A batch's `total_amount` and `line_count` are fixed at submission
//! - Line items and settlement records are only written alongside their
//!   owning batch, preserving referential integrity
//! - The activity log is append-only

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use storage::Storage;
pub use types::{
    ActivityAction, ActivityEvent, Actor, ActorId, ActorRole, Batch, BatchStatus, FailureReason,
    ItemStatus, LineItem, LineItemDraft, SettlementRecord, StoreStats, SubmitterSummary,
};
