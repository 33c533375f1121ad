use async_trait::async_trait;
use ferrous_zones_domain::{DnsZone, DomainError, ReconcileKey};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Change notification for one watched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(ReconcileKey),
    Updated(ReconcileKey),
    Deleted(ReconcileKey),
}

impl WatchEvent {
    pub fn key(&self) -> &ReconcileKey {
        match self {
            WatchEvent::Added(key) | WatchEvent::Updated(key) | WatchEvent::Deleted(key) => key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WatchEvent::Added(_) => "added",
            WatchEvent::Updated(_) => "updated",
            WatchEvent::Deleted(_) => "deleted",
        }
    }
}

/// Local cache of the watched resources.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_by_key(&self, key: &ReconcileKey) -> Result<Option<DnsZone>, DomainError>;

    /// True once the initial full listing has been loaded into the cache.
    fn has_synced(&self) -> bool;
}

/// Source of `DnsZone` change events backed by a [`ResourceStore`].
///
/// `run` delivers events until `shutdown` is cancelled.
#[async_trait]
pub trait ResourceWatcher: ResourceStore {
    async fn run(
        &self,
        events: mpsc::UnboundedSender<WatchEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError>;
}
