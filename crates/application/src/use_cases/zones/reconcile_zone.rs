use crate::ports::{HandlerFactory, ResourceStore, ZoneHandler};
use crate::services::ZoneRegistry;
use ferrous_zones_domain::{DomainError, ReconcileKey};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What a successful reconciliation did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new handler is serving the resource's zone.
    Bound { evicted: usize },
    /// The resource is gone and its binding was removed.
    Removed,
    /// The resource is gone and nothing was bound for it.
    Absent,
}

/// Brings the registry in line with the current state of one `DnsZone`.
///
/// Failures never touch the registry; the previous binding keeps serving
/// until a later attempt succeeds.
pub struct ReconcileZoneUseCase {
    store: Arc<dyn ResourceStore>,
    factory: Arc<dyn HandlerFactory>,
    registry: Arc<ZoneRegistry>,
}

impl ReconcileZoneUseCase {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        factory: Arc<dyn HandlerFactory>,
        registry: Arc<ZoneRegistry>,
    ) -> Self {
        Self {
            store,
            factory,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        &self.registry
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn execute(&self, key: &ReconcileKey) -> Result<ReconcileOutcome, DomainError> {
        let Some(resource) = self.store.get_by_key(key).await? else {
            return Ok(self.remove(key).await);
        };

        let config = resource.to_desired_config()?;
        debug!(zone = %config.from, upstreams = ?config.to, "Desired forwarding config");

        let handler = self.factory.create(&config).await?;

        if let Err(e) = handler.start().await {
            discard(&handler).await;
            return Err(e);
        }

        let eviction = self
            .registry
            .upsert(key.clone(), config.from.as_str(), Arc::clone(&handler));
        let evicted = eviction.len();

        for old in eviction {
            stop_handler(&old).await;
        }

        info!(
            zone = %config.from,
            handler = handler.name(),
            evicted,
            "DnsZone reconciled"
        );

        Ok(ReconcileOutcome::Bound { evicted })
    }

    async fn remove(&self, key: &ReconcileKey) -> ReconcileOutcome {
        match self.registry.delete(key) {
            Some(handler) => {
                stop_handler(&handler).await;
                info!(handler = handler.name(), "DnsZone deleted, handler removed");
                ReconcileOutcome::Removed
            }
            None => {
                debug!("DnsZone absent and not bound");
                ReconcileOutcome::Absent
            }
        }
    }
}

/// Stops a handler that is no longer reachable. Errors are only logged:
/// the handler is out of the registry and will not be stopped again.
pub(crate) async fn stop_handler(handler: &Arc<dyn ZoneHandler>) {
    if let Err(e) = handler.stop().await {
        warn!(handler = handler.name(), error = %e, "Handler stop failed");
    }
}

async fn discard(handler: &Arc<dyn ZoneHandler>) {
    debug!(handler = handler.name(), "Discarding handler that failed to start");
    stop_handler(handler).await;
}
