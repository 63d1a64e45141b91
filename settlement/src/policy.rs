//! Pluggable settlement policy
//!
//! The engine never decides an item's fate itself; it asks a policy. The
//! production policy models a payment rail with a configurable success rate,
//! while tests substitute deterministic policies to make outcomes
//! reproducible. Randomness lives here and nowhere else.

use crate::config::PolicyConfig;
use async_trait::async_trait;
use batch_store::{FailureReason, LineItem};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Per-item settlement outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Transfer accepted by the rail
    Paid,
    /// Transfer rejected
    Failed(FailureReason),
}

/// Decides the outcome of a single line item
///
/// Exactly one decision is requested per item over the item's lifetime.
/// Implementations may block or suspend (a real rail would); the simulated
/// rail resolves immediately unless configured with latency.
#[async_trait]
pub trait SettlementPolicy: Send + Sync {
    /// Decide the outcome for one item
    async fn decide(&self, item: &LineItem) -> Outcome;
}

/// Simulated payment rail
///
/// Succeeds with probability `success_rate`; on failure picks a reason
/// uniformly from the fixed reason set. Seedable for reproducible runs.
pub struct SimulatedRail {
    success_rate: f64,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedRail {
    /// Create entropy-seeded rail
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate,
            latency: Duration::ZERO,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create rail with a fixed seed
    pub fn with_seed(success_rate: f64, seed: u64) -> Self {
        Self {
            success_rate,
            latency: Duration::ZERO,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Add per-item latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build from configuration
    pub fn from_config(config: &PolicyConfig) -> Self {
        let rail = match config.seed {
            Some(seed) => Self::with_seed(config.success_rate, seed),
            None => Self::new(config.success_rate),
        };
        rail.with_latency(Duration::from_millis(config.latency_ms))
    }
}

#[async_trait]
impl SettlementPolicy for SimulatedRail {
    async fn decide(&self, item: &LineItem) -> Outcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let (roll, reason_idx) = {
            let mut rng = self.rng.lock();
            (rng.gen::<f64>(), rng.gen_range(0..FailureReason::ALL.len()))
        };

        if roll < self.success_rate {
            Outcome::Paid
        } else {
            let reason = FailureReason::ALL[reason_idx];
            tracing::debug!(item_id = %item.id, %reason, "Simulated rail rejected item");
            Outcome::Failed(reason)
        }
    }
}

/// Policy that pays every item
pub struct AlwaysPaid;

#[async_trait]
impl SettlementPolicy for AlwaysPaid {
    async fn decide(&self, _item: &LineItem) -> Outcome {
        Outcome::Paid
    }
}

/// Policy that fails every item with a fixed reason
pub struct AlwaysFailed(pub FailureReason);

#[async_trait]
impl SettlementPolicy for AlwaysFailed {
    async fn decide(&self, _item: &LineItem) -> Outcome {
        Outcome::Failed(self.0)
    }
}

/// Policy that fails only the n-th decided item (0-based)
pub struct FailNth {
    target: u32,
    reason: FailureReason,
    seen: AtomicU32,
}

impl FailNth {
    /// Create policy failing item `target` with `reason`
    pub fn new(target: u32, reason: FailureReason) -> Self {
        Self {
            target,
            reason,
            seen: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl SettlementPolicy for FailNth {
    async fn decide(&self, _item: &LineItem) -> Outcome {
        let idx = self.seen.fetch_add(1, Ordering::SeqCst);
        if idx == self.target {
            Outcome::Failed(self.reason)
        } else {
            Outcome::Paid
        }
    }
}
