use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use ferrous_zones_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Smallest well-formed DNS message: the fixed header
const DNS_HEADER_LEN: usize = 12;

/// DNS over UDP transport, one ephemeral socket per query.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if message_bytes.len() < DNS_HEADER_LEN {
            return Err(DomainError::InvalidDnsMessage(format!(
                "query of {} bytes is shorter than a DNS header",
                message_bytes.len()
            )));
        }

        let socket = UdpSocket::bind(self.bind_addr()).await.map_err(|e| {
            DomainError::IoError(format!("Failed to bind UDP socket: {}", e))
        })?;

        let bytes_sent =
            tokio::time::timeout(timeout, socket.send_to(message_bytes, self.server_addr))
                .await
                .map_err(|_| DomainError::QueryTimeout(self.server_addr.to_string()))?
                .map_err(|e| {
                    DomainError::IoError(format!(
                        "Failed to send UDP query to {}: {}",
                        self.server_addr, e
                    ))
                })?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| DomainError::QueryTimeout(self.server_addr.to_string()))?
                .map_err(|e| {
                    DomainError::IoError(format!(
                        "Failed to receive UDP response from {}: {}",
                        self.server_addr, e
                    ))
                })?;

        if from_addr.ip() != self.server_addr.ip() {
            warn!(
                expected = %self.server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        if recv_buf.len() < DNS_HEADER_LEN || recv_buf[..2] != message_bytes[..2] {
            return Err(DomainError::InvalidDnsMessage(format!(
                "response from {} does not match the query ID",
                self.server_addr
            )));
        }

        debug!(server = %self.server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }
}
