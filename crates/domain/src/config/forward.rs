use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every forwarding handler the controller creates
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardConfig {
    /// Per-upstream query timeout in milliseconds (default: 2000)
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,
}

impl ForwardConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout(),
        }
    }
}

fn default_query_timeout() -> u64 {
    2000
}
