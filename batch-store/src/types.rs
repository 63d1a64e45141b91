//! Core types for the batch store
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Closed status enumerations (no free-form status strings)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque actor identifier handed in by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Create new actor ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role claim carried by an actor identity
///
/// The core does not authorize; the claim is recorded for audit purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    /// Member organization submitting batches
    Submitter,
    /// Reviewer approving and settling batches
    Reviewer,
}

/// Actor identity as consumed from the authentication layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Opaque identifier
    pub id: ActorId,

    /// Display label (organization or reviewer name)
    pub label: String,

    /// Role claim
    pub role: ActorRole,
}

impl Actor {
    /// Create new actor
    pub fn new(id: impl Into<String>, label: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: ActorId::new(id),
            label: label.into(),
            role,
        }
    }

    /// Internal actor used for unattended operations (recovery)
    pub fn system() -> Self {
        Self::new("system", "Settlement Recovery", ActorRole::Reviewer)
    }
}

/// Batch status (state machine)
///
/// ```text
/// (none) --submit--> PendingApproval --begin--> Processing --finalize--> Processed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BatchStatus {
    /// Submitted, awaiting reviewer approval
    PendingApproval = 1,
    /// Settlement in flight
    Processing = 2,
    /// Settlement finalized (terminal)
    Processed = 3,
}

impl BatchStatus {
    /// Stable textual code
    pub fn code(&self) -> &'static str {
        match self {
            BatchStatus::PendingApproval => "pending_approval",
            BatchStatus::Processing => "processing",
            BatchStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reason a line item failed settlement
///
/// Closed set modeled on the rail's rejection codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FailureReason {
    /// Account number not recognized by the receiving bank
    InvalidAccount = 1,
    /// Receiving bank unavailable or rejected the transfer
    BankError = 2,
    /// Payee name does not match the account holder
    NameMismatch = 3,
}

impl FailureReason {
    /// All reasons, for uniform selection by stochastic policies
    pub const ALL: [FailureReason; 3] = [
        FailureReason::InvalidAccount,
        FailureReason::BankError,
        FailureReason::NameMismatch,
    ];

    /// Stable textual code
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::InvalidAccount => "invalid_account",
            FailureReason::BankError => "bank_error",
            FailureReason::NameMismatch => "name_mismatch",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Line item status
///
/// `Pending` until exactly one settlement attempt; `Paid`/`Failed` are
/// terminal and immutable. The failure reason exists only for failed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Awaiting settlement
    Pending,
    /// Settled successfully (terminal)
    Paid,
    /// Settlement failed (terminal)
    Failed(FailureReason),
}

impl ItemStatus {
    /// True once the item has been resolved
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::Pending)
    }

    /// Failure reason, if the item failed
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            ItemStatus::Failed(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// One bulk submission of payment instructions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Batch ID
    pub id: Uuid,

    /// Submitting organization
    pub submitter_id: ActorId,

    /// Submitter display label, captured at submission
    pub submitter_label: String,

    /// Originating source (e.g. uploaded filename)
    pub source_label: String,

    /// Number of line items, fixed at creation
    pub line_count: u32,

    /// Sum of line item amounts at submission; never recomputed afterwards
    pub total_amount: Decimal,

    /// Submission timestamp (immutable)
    pub created_at: DateTime<Utc>,

    /// Last status transition timestamp
    pub updated_at: DateTime<Utc>,

    /// Current status
    pub status: BatchStatus,

    /// Optional note set by the submitter
    pub submitter_note: Option<String>,

    /// Reviewer note, overwritable at any time
    pub reviewer_note: Option<String>,
}

/// One payee instruction within a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Item ID (UUIDv7)
    pub id: Uuid,

    /// Owning batch
    pub batch_id: Uuid,

    /// Position within the batch; storage order and settlement order
    pub seq: u32,

    /// Payee name
    pub payee_name: String,

    /// Payee bank
    pub payee_bank: String,

    /// Payee account number
    pub payee_account: String,

    /// Instruction amount (positive)
    pub amount: Decimal,

    /// Current status
    pub status: ItemStatus,
}

/// Validated line item input, as handed over by the parsing layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDraft {
    /// Payee name
    pub payee_name: String,

    /// Payee bank
    pub payee_bank: String,

    /// Payee account number
    pub payee_account: String,

    /// Instruction amount
    pub amount: Decimal,
}

impl LineItemDraft {
    /// Create new draft
    pub fn new(
        payee_name: impl Into<String>,
        payee_bank: impl Into<String>,
        payee_account: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            payee_name: payee_name.into(),
            payee_bank: payee_bank.into(),
            payee_account: payee_account.into(),
            amount,
        }
    }
}

/// Archival projection of a processed batch
///
/// Written exactly once, in the same atomic write that flips the batch to
/// `Processed`; the durable audit trail independent of the mutable batch row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Batch ID
    pub batch_id: Uuid,

    /// Submitter display label
    pub submitter_label: String,

    /// Originating source
    pub source_label: String,

    /// Number of line items
    pub line_count: u32,

    /// Total amount as submitted
    pub total_amount: Decimal,

    /// Finalization timestamp
    pub processed_at: DateTime<Utc>,
}

/// Activity log action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActivityAction {
    /// Actor authenticated (recorded by the auth layer, which shares the sink)
    Login = 1,
    /// Batch submitted
    Submission = 2,
    /// Reviewer note updated
    Review = 3,
    /// Batch settled
    Processed = 4,
}

impl ActivityAction {
    /// Stable textual code
    pub fn code(&self) -> &'static str {
        match self {
            ActivityAction::Login => "login",
            ActivityAction::Submission => "submission",
            ActivityAction::Review => "review",
            ActivityAction::Processed => "processed",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Append-only activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Acting identity
    pub actor_id: ActorId,

    /// Actor display label
    pub actor_label: String,

    /// Action performed
    pub action: ActivityAction,

    /// Free-text details
    pub details: String,
}

impl ActivityEvent {
    /// Create new event for an actor
    pub fn new(actor: &Actor, action: ActivityAction, details: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor_id: actor.id.clone(),
            actor_label: actor.label.clone(),
            action,
            details: details.into(),
        }
    }
}

/// Aggregate read-only summary over the whole store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Sum of amounts over paid line items
    pub total_paid_amount: Decimal,

    /// Number of paid line items
    pub paid_item_count: u64,

    /// Number of batches awaiting approval
    pub pending_batch_count: u64,
}

/// Per-submitter read-only summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitterSummary {
    /// Submitting organization
    pub submitter_id: ActorId,

    /// Sum of amounts over all submitted line items
    pub submitted_amount: Decimal,

    /// Sum of amounts over paid line items
    pub paid_amount: Decimal,

    /// Total line items submitted
    pub item_count: u64,

    /// Paid line items
    pub paid_item_count: u64,
}

impl SubmitterSummary {
    /// Fraction of items paid, in [0, 1]
    pub fn success_rate(&self) -> f64 {
        if self.item_count == 0 {
            return 0.0;
        }
        self.paid_item_count as f64 / self.item_count as f64
    }
}
