use super::handler::ForwardHandler;
use super::upstream::Upstream;
use async_trait::async_trait;
use ferrous_zones_application::ports::{HandlerFactory, ZoneHandler};
use ferrous_zones_domain::config::ForwardConfig;
use ferrous_zones_domain::{DesiredConfig, DomainError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builds a [`ForwardHandler`] per desired configuration.
pub struct ForwardHandlerFactory {
    query_timeout: Duration,
}

impl ForwardHandlerFactory {
    pub fn new(config: &ForwardConfig) -> Self {
        Self {
            query_timeout: config.query_timeout(),
        }
    }

    pub fn with_timeout(query_timeout: Duration) -> Self {
        Self { query_timeout }
    }
}

#[async_trait]
impl HandlerFactory for ForwardHandlerFactory {
    async fn create(&self, config: &DesiredConfig) -> Result<Arc<dyn ZoneHandler>, DomainError> {
        if config.to.is_empty() {
            return Err(DomainError::HandlerFactory {
                zone: config.from.to_string(),
                reason: "no upstreams".to_string(),
            });
        }

        let upstreams = config
            .to
            .iter()
            .map(|to| to.parse::<Upstream>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::HandlerFactory {
                zone: config.from.to_string(),
                reason: e.to_string(),
            })?;

        debug!(zone = %config.from, upstreams = upstreams.len(), "Creating forward handler");

        Ok(Arc::new(ForwardHandler::new(
            config.from.clone(),
            upstreams,
            self.query_timeout,
        )))
    }
}
