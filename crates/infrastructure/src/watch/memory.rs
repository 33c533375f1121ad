use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_zones_application::ports::{ResourceStore, ResourceWatcher, WatchEvent};
use ferrous_zones_domain::{DnsZone, DomainError, ReconcileKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// `DnsZone` cache that turns every mutation into a [`WatchEvent`].
///
/// When scoped to a namespace, resources from other namespaces are ignored
/// as if they did not exist.
pub struct InMemoryResourceWatcher {
    namespace: Option<String>,
    cache: DashMap<ReconcileKey, DnsZone>,
    synced: AtomicBool,
    // Held across every cache mutation so an attaching sink sees either the
    // snapshot or the event, never neither.
    sink: Mutex<Option<mpsc::UnboundedSender<WatchEvent>>>,
}

impl Default for InMemoryResourceWatcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl InMemoryResourceWatcher {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            cache: DashMap::new(),
            synced: AtomicBool::new(false),
            sink: Mutex::new(None),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn sink(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<WatchEvent>>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_scope(&self, zone: &DnsZone) -> bool {
        match &self.namespace {
            Some(namespace) => zone.metadata.namespace == *namespace,
            None => true,
        }
    }

    fn emit(sink: &Option<mpsc::UnboundedSender<WatchEvent>>, event: WatchEvent) {
        trace!(key = %event.key(), event = event.kind(), "Watch event");
        if let Some(tx) = sink {
            // A closed receiver only means nobody is listening any more.
            let _ = tx.send(event);
        }
    }

    fn apply_locked(
        &self,
        sink: &Option<mpsc::UnboundedSender<WatchEvent>>,
        zone: DnsZone,
    ) -> Option<WatchEvent> {
        if !self.in_scope(&zone) {
            trace!(key = %zone.key(), "Ignoring DnsZone outside watched namespace");
            return None;
        }

        let key = zone.key();
        let event = match self.cache.insert(key.clone(), zone.clone()) {
            None => WatchEvent::Added(key),
            Some(previous) if previous == zone => return None,
            Some(_) => WatchEvent::Updated(key),
        };
        Self::emit(sink, event.clone());
        Some(event)
    }

    fn remove_locked(
        &self,
        sink: &Option<mpsc::UnboundedSender<WatchEvent>>,
        key: &ReconcileKey,
    ) -> Option<WatchEvent> {
        self.cache.remove(key)?;
        let event = WatchEvent::Deleted(key.clone());
        Self::emit(sink, event.clone());
        Some(event)
    }

    /// Inserts or replaces a resource. Returns the event emitted, if the
    /// cache changed.
    pub fn apply(&self, zone: DnsZone) -> Option<WatchEvent> {
        let sink = self.sink();
        self.apply_locked(&sink, zone)
    }

    pub fn remove(&self, key: &ReconcileKey) -> Option<WatchEvent> {
        let sink = self.sink();
        self.remove_locked(&sink, key)
    }

    /// Makes the cache hold exactly `zones` (after namespace filtering),
    /// emitting one event per difference.
    pub fn replace_all(&self, zones: Vec<DnsZone>) -> Vec<WatchEvent> {
        let desired: HashMap<ReconcileKey, DnsZone> = zones
            .into_iter()
            .filter(|zone| self.in_scope(zone))
            .map(|zone| (zone.key(), zone))
            .collect();

        let sink = self.sink();
        let stale: Vec<ReconcileKey> = self
            .cache
            .iter()
            .filter(|entry| !desired.contains_key(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        let mut events = Vec::new();
        for key in &stale {
            events.extend(self.remove_locked(&sink, key));
        }
        for zone in desired.into_values() {
            events.extend(self.apply_locked(&sink, zone));
        }
        events
    }

    /// Marks the initial listing as loaded.
    pub fn mark_synced(&self) {
        if !self.synced.swap(true, Ordering::AcqRel) {
            debug!(resources = self.cache.len(), "DnsZone cache synced");
        }
    }

    /// Routes future events to `events`, first replaying every cached
    /// resource as `Added`.
    pub fn attach(&self, events: mpsc::UnboundedSender<WatchEvent>) {
        let mut sink = self.sink();
        for entry in self.cache.iter() {
            let _ = events.send(WatchEvent::Added(entry.key().clone()));
        }
        *sink = Some(events);
    }

    pub fn detach(&self) {
        self.sink().take();
    }

    pub fn keys(&self) -> Vec<ReconcileKey> {
        self.cache.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceWatcher {
    async fn get_by_key(&self, key: &ReconcileKey) -> Result<Option<DnsZone>, DomainError> {
        Ok(self.cache.get(key).map(|entry| entry.value().clone()))
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ResourceWatcher for InMemoryResourceWatcher {
    async fn run(
        &self,
        events: mpsc::UnboundedSender<WatchEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        self.attach(events);
        shutdown.cancelled().await;
        self.detach();
        Ok(())
    }
}
