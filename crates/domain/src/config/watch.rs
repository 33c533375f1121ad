use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where `DnsZone` resources come from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    /// TOML manifest holding `[[zones]]` entries
    #[serde(default)]
    pub manifest_path: Option<String>,

    /// How often the manifest is re-read (default: 5s)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            manifest_path: None,
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}
