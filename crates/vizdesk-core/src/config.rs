use serde::{Deserialize, Serialize};

use crate::reconcile::SnapshotMode;

pub const DEFAULT_GENERATE_MESSAGE: &str = "Generate visualization";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub reconcile: ReconcileConfig,
    pub session: SessionConfig,
    pub cli: CliConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub snapshot_mode: SnapshotMode,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Chat message sent to the agent by the generate action.
    pub generate_message: String,
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generate_message: DEFAULT_GENERATE_MESSAGE.to_string(),
            log_capacity: 500,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    pub log_filter: String,
    pub poll_interval_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            poll_interval_ms: 250,
        }
    }
}
