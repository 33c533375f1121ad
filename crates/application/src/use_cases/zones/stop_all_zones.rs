use super::reconcile_zone::stop_handler;
use crate::services::ZoneRegistry;
use std::sync::Arc;
use tracing::{info, instrument};

/// Empties the registry and stops every handler that was still bound.
pub struct StopAllZonesUseCase {
    registry: Arc<ZoneRegistry>,
}

impl StopAllZonesUseCase {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self { registry }
    }

    /// Returns how many handlers were stopped.
    #[instrument(skip(self))]
    pub async fn execute(&self) -> usize {
        let handlers = self.registry.drain();
        let count = handlers.len();

        for handler in &handlers {
            stop_handler(handler).await;
        }

        info!(stopped = count, "All zone handlers stopped");
        count
    }
}
