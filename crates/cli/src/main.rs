//! # Ferrous Zones
//!
//! DNS forwarder whose zone → upstream table follows `DnsZone` resources
//! at runtime.

mod bootstrap;
mod di;
mod server;

use clap::Parser;
use ferrous_zones_domain::CliOverrides;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "ferrous-zones")]
#[command(version)]
#[command(about = "DNS zone forwarding controller driven by DnsZone resources")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Manifest file holding `[[zones]]` DnsZone entries
    #[arg(short = 'm', long)]
    manifest: Option<String>,

    /// Only watch DnsZones in this namespace
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Number of reconcile workers
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            dns_port: self.dns_port,
            bind_address: self.bind.clone(),
            namespace: self.namespace.clone(),
            workers: self.workers,
            manifest_path: self.manifest.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);
    bootstrap::log_config(cli.config.as_deref(), &config);

    let services = di::ZoneServices::build(&config)?;
    let controller_task = services.controller.spawn(config.controller.workers);

    if services
        .controller
        .wait_for_sync(config.controller.sync_timeout())
        .await
    {
        info!(zones = services.registry.len(), "DnsZone cache synced");
    } else {
        warn!(
            timeout_secs = config.controller.sync_timeout_secs,
            "DnsZone cache not synced yet, serving anyway"
        );
    }

    let shutdown = CancellationToken::new();
    let mut dns_task = tokio::spawn(server::start_dns_server(
        config.server.dns_addr(),
        services.dns_handler.clone(),
        shutdown.clone(),
    ));

    info!("Server ready! Press Ctrl+C to stop");

    let dns_exited = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            false
        }
        result = &mut dns_task => {
            match result {
                Ok(Ok(())) => warn!("DNS server exited"),
                Ok(Err(e)) => error!(error = %e, "DNS server failed"),
                Err(e) => error!(error = %e, "DNS server task panicked"),
            }
            true
        }
    };

    shutdown.cancel();
    if let Err(e) = services.controller.stop() {
        warn!(error = %e, "Controller stop");
    }
    controller_task.await?;

    if !dns_exited {
        dns_task.await??;
    }

    info!("Shutdown complete");
    Ok(())
}
