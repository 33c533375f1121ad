use crate::ports::ZoneHandler;
use ferrous_zones_domain::{ReconcileKey, ZoneName};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// True when both `Arc`s point at the same handler instance.
pub fn same_handler(a: &Arc<dyn ZoneHandler>, b: &Arc<dyn ZoneHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Handlers pushed out of the registry by an [`ZoneRegistry::upsert`].
///
/// At most two: the one previously owned by the key and the one previously
/// serving the zone under another key.
#[derive(Default)]
pub struct Eviction {
    handlers: SmallVec<[Arc<dyn ZoneHandler>; 2]>,
}

impl Eviction {
    pub fn was_replacement(&self) -> bool {
        !self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Arc<dyn ZoneHandler>] {
        &self.handlers
    }

    fn push(&mut self, handler: Arc<dyn ZoneHandler>, installed: &Arc<dyn ZoneHandler>) {
        if same_handler(&handler, installed) {
            return;
        }
        if self.handlers.iter().any(|h| same_handler(h, &handler)) {
            return;
        }
        self.handlers.push(handler);
    }
}

impl IntoIterator for Eviction {
    type Item = Arc<dyn ZoneHandler>;
    type IntoIter = smallvec::IntoIter<[Arc<dyn ZoneHandler>; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

struct Binding {
    key: ReconcileKey,
    handler: Arc<dyn ZoneHandler>,
}

#[derive(Default)]
struct Tables {
    key_to_zone: HashMap<ReconcileKey, ZoneName>,
    zone_to_binding: HashMap<ZoneName, Binding>,
}

/// Concurrent key → zone → handler map shared by the controller (writer)
/// and the router (reader).
///
/// Both tables sit behind one lock so readers never see them disagree.
/// The registry never starts or stops handlers.
#[derive(Default)]
pub struct ZoneRegistry {
    tables: RwLock<Tables>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Nothing panics between the two table writes, so poisoned tables are
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `key` to `zone` served by `handler`.
    ///
    /// Any zone previously owned by `key` is released, and any other key that
    /// owned `zone` loses its binding. The displaced handlers are returned so
    /// the caller can stop them.
    pub fn upsert(
        &self,
        key: ReconcileKey,
        zone: &str,
        handler: Arc<dyn ZoneHandler>,
    ) -> Eviction {
        let zone = ZoneName::normalize(zone);
        let mut eviction = Eviction::default();
        let mut tables = self.write();

        if let Some(old_zone) = tables.key_to_zone.remove(&key) {
            if let Some(old) = tables.zone_to_binding.remove(&old_zone) {
                eviction.push(old.handler, &handler);
            }
        }

        if let Some(previous_owner) = tables.zone_to_binding.remove(&zone) {
            tables.key_to_zone.remove(&previous_owner.key);
            debug!(
                zone = %zone,
                previous_key = %previous_owner.key,
                key = %key,
                "Zone taken over by another key"
            );
            eviction.push(previous_owner.handler, &handler);
        }

        tables.key_to_zone.insert(key.clone(), zone.clone());
        tables
            .zone_to_binding
            .insert(zone, Binding { key, handler });

        eviction
    }

    /// Looks up the handler serving `zone` (normalized first).
    pub fn get(&self, zone: &str) -> Option<Arc<dyn ZoneHandler>> {
        let zone = ZoneName::normalize(zone);
        self.get_normalized(zone.as_str())
    }

    /// Lookup for callers that already hold a canonical name; no allocation.
    pub fn get_normalized(&self, zone: &str) -> Option<Arc<dyn ZoneHandler>> {
        self.read()
            .zone_to_binding
            .get(zone)
            .map(|binding| Arc::clone(&binding.handler))
    }

    /// Removes the binding owned by `key`. Unknown keys are a no-op.
    pub fn delete(&self, key: &ReconcileKey) -> Option<Arc<dyn ZoneHandler>> {
        let mut tables = self.write();
        let zone = tables.key_to_zone.remove(key)?;
        tables
            .zone_to_binding
            .remove(&zone)
            .map(|binding| binding.handler)
    }

    pub fn zone_for_key(&self, key: &ReconcileKey) -> Option<ZoneName> {
        self.read().key_to_zone.get(key).cloned()
    }

    pub fn list(&self) -> Vec<Arc<dyn ZoneHandler>> {
        self.read()
            .zone_to_binding
            .values()
            .map(|binding| Arc::clone(&binding.handler))
            .collect()
    }

    /// Empties the registry, handing back every handler exactly once.
    pub fn drain(&self) -> Vec<Arc<dyn ZoneHandler>> {
        let mut tables = self.write();
        tables.key_to_zone.clear();
        tables
            .zone_to_binding
            .drain()
            .map(|(_, binding)| binding.handler)
            .collect()
    }

    pub fn zones(&self) -> Vec<ZoneName> {
        let mut zones: Vec<ZoneName> = self.read().zone_to_binding.keys().cloned().collect();
        zones.sort();
        zones
    }

    pub fn len(&self) -> usize {
        self.read().zone_to_binding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().zone_to_binding.is_empty()
    }
}
