use async_trait::async_trait;
use ferrous_zones_domain::{DnsRequest, DnsResponse, DomainError};

/// Anything that can answer a DNS query.
///
/// The router is itself a `QueryHandler`, so handler chains compose.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn serve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError>;
}

/// A query handler with a managed lifecycle, bound to one zone at a time.
///
/// The controller calls `start` before the handler becomes reachable and
/// `stop` exactly once after it is no longer reachable.
#[async_trait]
pub trait ZoneHandler: QueryHandler {
    async fn start(&self) -> Result<(), DomainError>;

    async fn stop(&self) -> Result<(), DomainError>;
}
