use serde::{Deserialize, Serialize};

use crate::rewriter::drift::{DEFAULT_BUDGET_INTERVAL_MS, DEFAULT_DRIFT_THRESHOLD_MS};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Drift (ms) between tag timestamps and wall clock that triggers a
    /// clock-sync tag
    #[serde(default = "default_drift_threshold")]
    pub drift_threshold_ms: u32,

    /// Minimum wall-clock spacing (ms) between bandwidth-budget tags
    #[serde(default = "default_budget_interval")]
    pub budget_interval_ms: u64,
}

fn default_drift_threshold() -> u32 {
    DEFAULT_DRIFT_THRESHOLD_MS
}

fn default_budget_interval() -> u64 {
    DEFAULT_BUDGET_INTERVAL_MS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            drift_threshold_ms: default_drift_threshold(),
            budget_interval_ms: default_budget_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Stream name announced downstream instead of the source `streamName`
    #[serde(default)]
    pub stream_name: Option<String>,
}
