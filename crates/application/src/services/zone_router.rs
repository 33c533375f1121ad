use super::ZoneRegistry;
use crate::ports::{QueryHandler, ZoneHandler};
use async_trait::async_trait;
use ferrous_zones_domain::{DnsRequest, DnsResponse, DomainError, ZoneName};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

const ROUTER_NAME: &str = "zone-router";

/// Routes a query to the most specific registered zone, falling through to
/// the next handler in the chain when no zone matches.
pub struct ZoneRouter {
    registry: Arc<ZoneRegistry>,
    next: Option<Arc<dyn QueryHandler>>,
    zones: Vec<ZoneName>,
}

impl ZoneRouter {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self {
            registry,
            next: None,
            zones: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: Arc<dyn QueryHandler>) -> Self {
        self.next = Some(next);
        self
    }

    /// Restricts routing to names under these zones; anything else falls
    /// straight through.
    pub fn with_zones(mut self, zones: Vec<ZoneName>) -> Self {
        self.zones = zones;
        self
    }

    /// Longest-suffix match of `name` against the registry.
    ///
    /// Starts with the whole name and drops one label from the left per
    /// step, so the first hit is the most specific zone present.
    pub fn find_handler(&self, name: &str) -> Option<Arc<dyn ZoneHandler>> {
        let name: Cow<'_, str> =
            if name.ends_with('.') && !name.bytes().any(|b| b.is_ascii_uppercase()) {
                Cow::Borrowed(name)
            } else {
                let mut owned = name.trim_end_matches('.').to_ascii_lowercase();
                owned.push('.');
                Cow::Owned(owned)
            };

        let mut offset = 0;
        loop {
            let candidate = &name[offset..];
            if let Some(handler) = self.registry.get_normalized(candidate) {
                debug!(query = %name, zone = %candidate, "Zone match");
                return Some(handler);
            }
            match candidate.find('.') {
                Some(dot) if dot + 1 < candidate.len() => offset += dot + 1,
                _ => break,
            }
        }

        if name.as_ref() != "." {
            if let Some(handler) = self.registry.get_normalized(".") {
                debug!(query = %name, zone = ".", "Zone match");
                return Some(handler);
            }
        }

        None
    }

    fn in_scope(&self, name: &str) -> bool {
        self.zones.is_empty() || self.zones.iter().any(|zone| zone.contains(name))
    }

    async fn fall_through(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        match &self.next {
            Some(next) => {
                debug!(query = %request.name, next = next.name(), "No matching zone, falling through");
                next.serve(request).await
            }
            None => Err(DomainError::NotHandled(request.name.to_string())),
        }
    }
}

#[async_trait]
impl QueryHandler for ZoneRouter {
    fn name(&self) -> &str {
        ROUTER_NAME
    }

    async fn serve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        let name = request.normalized_name();

        if !self.in_scope(&name) {
            return self.fall_through(request).await;
        }

        match self.find_handler(&name) {
            Some(handler) => handler.serve(request).await,
            None => self.fall_through(request).await,
        }
    }
}
