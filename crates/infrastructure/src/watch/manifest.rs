use super::memory::InMemoryResourceWatcher;
use async_trait::async_trait;
use ferrous_zones_application::ports::{ResourceStore, ResourceWatcher, WatchEvent};
use ferrous_zones_domain::config::WatchConfig;
use ferrous_zones_domain::{
    DnsZone, DnsZoneSpec, DomainError, ObjectMeta, ReconcileKey, DNS_ZONE_API_VERSION,
    DNS_ZONE_KIND,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One `[[zones]]` table of a manifest file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub zone_name: String,
    #[serde(default)]
    pub forward_to: String,
    #[serde(default = "default_kind")]
    pub kind: String,
}

impl ManifestEntry {
    pub fn into_resource(self) -> DnsZone {
        DnsZone {
            api_version: DNS_ZONE_API_VERSION.to_string(),
            kind: self.kind,
            metadata: ObjectMeta {
                name: self.name,
                namespace: self.namespace,
            },
            spec: DnsZoneSpec {
                zone_name: self.zone_name,
                forward_to: self.forward_to,
            },
        }
    }
}

/// TOML document listing `DnsZone` resources.
///
/// ```toml
/// [[zones]]
/// name = "corp"
/// namespace = "default"
/// zoneName = "corp.example."
/// forwardTo = "10.0.0.53"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub zones: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_toml(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::WatchFailed(format!("Invalid manifest: {}", e)))
    }

    /// Converts the entries into resources. A key listed twice keeps its
    /// last entry.
    pub fn into_resources(self) -> Vec<DnsZone> {
        let mut seen = HashSet::new();
        let mut resources: Vec<DnsZone> = self
            .zones
            .into_iter()
            .rev()
            .map(ManifestEntry::into_resource)
            .filter(|zone| {
                let fresh = seen.insert(zone.key());
                if !fresh {
                    warn!(key = %zone.key(), "Duplicate DnsZone in manifest, keeping last entry");
                }
                fresh
            })
            .collect();
        resources.reverse();
        resources
    }
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_kind() -> String {
    DNS_ZONE_KIND.to_string()
}

/// Watches a manifest file by re-reading it every poll interval and
/// diffing it against the cached resources.
///
/// The cache counts as synced after the first successful read. A file that
/// later fails to read or parse leaves the cache as it was.
pub struct ManifestWatcher {
    path: PathBuf,
    poll_interval: Duration,
    store: InMemoryResourceWatcher,
}

impl ManifestWatcher {
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration, namespace: Option<String>) -> Self {
        Self {
            path: path.into(),
            poll_interval,
            store: InMemoryResourceWatcher::new(namespace),
        }
    }

    /// Builds the watcher from configuration. Fails when no manifest path
    /// is configured.
    pub fn from_config(config: &WatchConfig, namespace: Option<String>) -> Result<Self, DomainError> {
        let path = config.manifest_path.as_deref().ok_or_else(|| {
            DomainError::WatchFailed("no manifest path configured".to_string())
        })?;
        Ok(Self::new(path, config.poll_interval(), namespace))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &InMemoryResourceWatcher {
        &self.store
    }

    /// Reads the manifest once and applies the differences to the cache.
    pub async fn reload(&self) -> Result<Vec<WatchEvent>, DomainError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::WatchFailed(format!(
                "Failed to read manifest {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let resources = Manifest::from_toml(&content)?.into_resources();
        let events = self.store.replace_all(resources);
        self.store.mark_synced();

        if !events.is_empty() {
            info!(
                path = %self.path.display(),
                changes = events.len(),
                resources = self.store.len(),
                "Manifest changed"
            );
        }
        Ok(events)
    }
}

#[async_trait]
impl ResourceStore for ManifestWatcher {
    async fn get_by_key(&self, key: &ReconcileKey) -> Result<Option<DnsZone>, DomainError> {
        self.store.get_by_key(key).await
    }

    fn has_synced(&self) -> bool {
        self.store.has_synced()
    }
}

#[async_trait]
impl ResourceWatcher for ManifestWatcher {
    async fn run(
        &self,
        events: mpsc::UnboundedSender<WatchEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        info!(
            path = %self.path.display(),
            interval_secs = self.poll_interval.as_secs(),
            namespace = self.store.namespace().unwrap_or("*"),
            "Watching DnsZone manifest"
        );

        self.store.attach(events);

        loop {
            if let Err(e) = self.reload().await {
                if self.store.has_synced() {
                    warn!(error = %e, "Manifest reload failed, keeping previous resources");
                } else {
                    warn!(error = %e, "Initial manifest load failed, will retry");
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        self.store.detach();
        debug!(path = %self.path.display(), "Manifest watcher stopped");
        Ok(())
    }
}
