//! Configuration for the settlement pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Batch store data directory
    pub store_data_dir: PathBuf,

    /// Settlement policy configuration
    pub policy: PolicyConfig,

    /// Stuck-batch recovery configuration
    pub recovery: RecoveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            store_data_dir: PathBuf::from("./data/batch-store"),
            policy: PolicyConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Simulated rail policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Per-item success probability (0.0 - 1.0)
    pub success_rate: f64,

    /// RNG seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,

    /// Simulated per-item rail latency (milliseconds)
    pub latency_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.95,
            seed: None,
            latency_ms: 0,
        }
    }
}

/// What to do with a batch stuck in `Processing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    /// Re-enter settlement; safe because settlement is idempotent over
    /// already-resolved items
    Resume,
    /// Return the batch to `PendingApproval` for manual retry
    Revert,
}

/// Stuck-batch recovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// A `Processing` batch untouched for this long is considered stuck
    pub stuck_after_seconds: u64,

    /// Reconciliation policy
    pub mode: RecoveryMode,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            stuck_after_seconds: 900, // 15 minutes
            mode: RecoveryMode::Resume,
        }
    }
}

impl Config {
    /// Store configuration derived from this pipeline configuration
    pub fn store_config(&self) -> batch_store::Config {
        batch_store::Config {
            data_dir: self.store_data_dir.clone(),
            ..batch_store::Config::default()
        }
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(dir) = std::env::var("PAYOUT_STORE_DIR") {
            config.store_data_dir = PathBuf::from(dir);
        }

        if let Ok(rate) = std::env::var("PAYOUT_SUCCESS_RATE") {
            config.policy.success_rate = rate
                .parse()
                .map_err(|_| crate::Error::Config(format!("Bad PAYOUT_SUCCESS_RATE: {}", rate)))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.policy.success_rate) {
            return Err(crate::Error::Config(format!(
                "success_rate must be within [0, 1], got {}",
                self.policy.success_rate
            )));
        }
        Ok(())
    }
}
