use ferrous_zones_domain::{CliOverrides, Config};
use tracing::info;

/// Loads and validates the configuration.
pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logs the effective configuration once logging is up.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        dns_addr = %config.server.dns_addr(),
        zones = ?config.server.zones,
        workers = config.controller.workers,
        namespace = config.controller.namespace.as_deref().unwrap_or("*"),
        manifest = config.watch.manifest_path.as_deref().unwrap_or("none"),
        "Configuration loaded"
    );
}
