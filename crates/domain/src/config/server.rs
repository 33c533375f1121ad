use crate::ZoneName;
use serde::{Deserialize, Serialize};

/// DNS front end listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Zones the router answers for. Empty means every name is routed.
    #[serde(default)]
    pub zones: Vec<String>,
}

impl ServerConfig {
    pub fn dns_addr(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }

    pub fn zone_names(&self) -> Vec<ZoneName> {
        self.zones.iter().map(|zone| ZoneName::normalize(zone)).collect()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            bind_address: default_bind_address(),
            zones: Vec::new(),
        }
    }
}

fn default_dns_port() -> u16 {
    53
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
