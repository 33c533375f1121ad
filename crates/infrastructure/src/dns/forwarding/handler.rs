use super::upstream::Upstream;
use crate::dns::transport::{DnsTransport, UdpTransport};
use async_trait::async_trait;
use ferrous_zones_application::ports::{QueryHandler, ZoneHandler};
use ferrous_zones_domain::{DnsRequest, DnsResponse, DomainError, ZoneName};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Created,
    Running,
    Stopped,
}

struct UpstreamTransport {
    upstream: Upstream,
    transport: Arc<dyn DnsTransport>,
}

/// Relays queries for one zone to its upstreams, in order, until one
/// answers.
pub struct ForwardHandler {
    name: String,
    zone: ZoneName,
    upstreams: Vec<UpstreamTransport>,
    query_timeout: Duration,
    state: Mutex<HandlerState>,
}

impl ForwardHandler {
    pub fn new(zone: ZoneName, upstreams: Vec<Upstream>, query_timeout: Duration) -> Self {
        let upstreams = upstreams
            .into_iter()
            .map(|upstream| UpstreamTransport {
                transport: Arc::new(UdpTransport::new(upstream.addr())),
                upstream,
            })
            .collect();

        Self {
            name: format!("forward({})", zone),
            zone,
            upstreams,
            query_timeout,
            state: Mutex::new(HandlerState::Created),
        }
    }

    pub fn zone(&self) -> &ZoneName {
        &self.zone
    }

    pub fn upstreams(&self) -> impl Iterator<Item = &Upstream> {
        self.upstreams.iter().map(|u| &u.upstream)
    }

    pub fn state(&self) -> HandlerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QueryHandler for ForwardHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn serve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        // A stopped handler still answers queries routed to it before it was
        // swapped out; the registry no longer hands it new ones.
        if self.state() == HandlerState::Created {
            return Err(DomainError::NotHandled(format!(
                "{} was never started",
                self.name
            )));
        }

        let mut last_error = None;
        for entry in &self.upstreams {
            match entry
                .transport
                .send(&request.wire, self.query_timeout)
                .await
            {
                Ok(response) => {
                    debug!(
                        query = %request.name,
                        upstream = %entry.upstream,
                        protocol = response.protocol_used,
                        "Forwarded query answered"
                    );
                    return Ok(DnsResponse::from_upstream(
                        response.bytes,
                        Arc::clone(entry.upstream.label()),
                    ));
                }
                Err(e) => {
                    warn!(
                        query = %request.name,
                        upstream = %entry.upstream,
                        error = %e,
                        "Upstream failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(DomainError::UpstreamsExhausted(match last_error {
            Some(e) => format!("{}: {}", self.zone, e),
            None => format!("{}: no upstreams configured", self.zone),
        }))
    }
}

#[async_trait]
impl ZoneHandler for ForwardHandler {
    async fn start(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            HandlerState::Created => {
                *state = HandlerState::Running;
                info!(handler = %self.name, upstreams = self.upstreams.len(), "Forward handler started");
                Ok(())
            }
            HandlerState::Running => Ok(()),
            HandlerState::Stopped => Err(DomainError::HandlerStart {
                handler: self.name.clone(),
                reason: "handler was already stopped".to_string(),
            }),
        }
    }

    async fn stop(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == HandlerState::Stopped {
            return Err(DomainError::HandlerStop {
                handler: self.name.clone(),
                reason: "handler was already stopped".to_string(),
            });
        }
        *state = HandlerState::Stopped;
        info!(handler = %self.name, "Forward handler stopped");
        Ok(())
    }
}
