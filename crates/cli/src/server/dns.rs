use ferrous_zones_infrastructure::dns::server::DnsServerHandler;
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::info;

const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Serves DNS over UDP and TCP until `shutdown` is cancelled.
pub async fn start_dns_server(
    bind_addr: String,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr = SocketAddr::from_str(&bind_addr)?;

    info!(bind_address = %socket_addr, "Starting DNS server");

    let udp_socket = UdpSocket::bind(socket_addr).await?;
    info!(protocol = "UDP", "DNS server listening");

    let tcp_listener = TcpListener::bind(socket_addr).await?;
    info!(protocol = "TCP", "DNS server listening");

    let mut server = ServerFuture::new(handler);
    server.register_socket(udp_socket);
    server.register_listener(tcp_listener, TCP_IDLE_TIMEOUT);

    info!("DNS server ready to accept queries");

    let finished = tokio::select! {
        result = server.block_until_done() => Some(result),
        _ = shutdown.cancelled() => None,
    };
    match finished {
        Some(result) => result?,
        None => server.shutdown_gracefully().await?,
    }

    info!("DNS server stopped");
    Ok(())
}
