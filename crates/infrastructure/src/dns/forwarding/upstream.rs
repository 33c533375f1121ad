use ferrous_zones_domain::DomainError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

const DEFAULT_DNS_PORT: u16 = 53;
const DNS_SCHEME: &str = "dns://";

/// One upstream server a zone is forwarded to.
///
/// Accepted forms: `1.2.3.4`, `1.2.3.4:5353`, `dns://1.2.3.4[:port]`,
/// `2001:db8::1`, `[2001:db8::1]:5353`. The host must be an IP literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    addr: SocketAddr,
    label: Arc<str>,
}

impl Upstream {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            label: Arc::from(addr.to_string()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `ip:port` form used in logs and [`ferrous_zones_domain::DnsResponse::upstream`].
    pub fn label(&self) -> &Arc<str> {
        &self.label
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Upstream {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidUpstream("empty upstream".to_string()));
        }

        let host_port = match raw.find("://") {
            Some(idx) => {
                let scheme = &raw[..idx + 3];
                if !scheme.eq_ignore_ascii_case(DNS_SCHEME) {
                    return Err(DomainError::InvalidUpstream(format!(
                        "only plain DNS upstreams are supported, got '{}'",
                        raw
                    )));
                }
                &raw[idx + 3..]
            }
            None => raw,
        };

        if let Ok(addr) = SocketAddr::from_str(host_port) {
            return Ok(Self::new(addr));
        }

        if let Ok(ip) = IpAddr::from_str(host_port) {
            return Ok(Self::new(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }

        if let Some(inner) = host_port
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if let Ok(ip) = IpAddr::from_str(inner) {
                return Ok(Self::new(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
            }
        }

        Err(DomainError::InvalidUpstream(format!(
            "'{}' is not an IP address with optional port",
            raw
        )))
    }
}
