use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reconciliation controller settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Number of worker tasks reconciling keys in parallel (default: 1)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Only watch `DnsZone` resources in this namespace. `None` watches all.
    #[serde(default)]
    pub namespace: Option<String>,

    /// How long startup waits for the initial listing (default: 5s)
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    /// First retry delay after a failed reconciliation (default: 5ms)
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Retry delay ceiling (default: 1000s)
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl ControllerConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            namespace: None,
            sync_timeout_secs: default_sync_timeout_secs(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

fn default_workers() -> usize {
    1
}

fn default_sync_timeout_secs() -> u64 {
    5
}

fn default_base_backoff_ms() -> u64 {
    5
}

fn default_max_backoff_secs() -> u64 {
    1000
}
