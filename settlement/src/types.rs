//! Core types for the settlement pipeline

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate outcome of settling one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Batch ID
    pub batch_id: Uuid,

    /// Submitter display label
    pub submitter_label: String,

    /// Items settled successfully
    pub paid_count: u32,

    /// Items that failed settlement
    pub failed_count: u32,

    /// Total amount as submitted; failures are reported separately,
    /// not netted out
    pub total_amount: Decimal,
}

impl SettlementResult {
    /// Total items resolved
    pub fn resolved_count(&self) -> u32 {
        self.paid_count + self.failed_count
    }
}

/// Incremental settlement progress
///
/// Published after each resolved item; `fraction()` is monotonically
/// non-decreasing and reaches 1.0 exactly when the terminal
/// [`SettlementResult`] is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Items resolved so far
    pub resolved: u32,

    /// Items in the batch
    pub total: u32,
}

impl Progress {
    /// Fraction of items resolved, in [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.resolved) / f64::from(self.total)
    }
}
