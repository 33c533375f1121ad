use super::{
    ConfigError, ControllerConfig, ForwardConfig, LoggingConfig, ServerConfig, WatchConfig,
};
use crate::ZoneName;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Values passed on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub namespace: Option<String>,
    pub workers: Option<usize>,
    pub manifest_path: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub forward: ForwardConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads the TOML file at `path` (or defaults when `None`) and applies
    /// CLI overrides on top.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(namespace) = overrides.namespace {
            self.controller.namespace = Some(namespace);
        }
        if let Some(workers) = overrides.workers {
            self.controller.workers = workers;
        }
        if let Some(path) = overrides.manifest_path {
            self.watch.manifest_path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for zone in &self.server.zones {
            ZoneName::parse(zone).map_err(|e| {
                ConfigError::Validation(format!("server.zones: {}", e))
            })?;
        }
        if self.controller.workers == 0 {
            return Err(ConfigError::Validation(
                "controller.workers must be at least 1".to_string(),
            ));
        }
        if self.controller.base_backoff_ms == 0 {
            return Err(ConfigError::Validation(
                "controller.base_backoff_ms must be greater than 0".to_string(),
            ));
        }
        if self.controller.max_backoff().as_millis() < u128::from(self.controller.base_backoff_ms)
        {
            return Err(ConfigError::Validation(
                "controller.max_backoff_secs must not be below base_backoff_ms".to_string(),
            ));
        }
        if matches!(self.controller.namespace.as_deref(), Some("")) {
            return Err(ConfigError::Validation(
                "controller.namespace cannot be empty; omit it to watch all namespaces"
                    .to_string(),
            ));
        }
        if self.forward.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "forward.query_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.watch.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "watch.poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }
}
