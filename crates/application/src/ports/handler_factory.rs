use super::ZoneHandler;
use async_trait::async_trait;
use ferrous_zones_domain::{DesiredConfig, DomainError};
use std::sync::Arc;

/// Builds a fresh, not yet started handler for a desired configuration.
#[async_trait]
pub trait HandlerFactory: Send + Sync {
    async fn create(&self, config: &DesiredConfig) -> Result<Arc<dyn ZoneHandler>, DomainError>;
}
