use crate::{DesiredConfig, DomainError, ReconcileKey, ZoneName};
use serde::{Deserialize, Serialize};

pub const DNS_ZONE_KIND: &str = "DNSZone";
pub const DNS_ZONE_API_VERSION: &str = "coredns.io/v1alpha1";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

/// Spec of a `DnsZone`: the zone to take over and where to forward it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZoneSpec {
    #[serde(default)]
    pub zone_name: String,
    #[serde(default)]
    pub forward_to: String,
}

/// Declarative resource describing one forwarded zone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZone {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DnsZoneSpec,
}

impl DnsZone {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        zone_name: impl Into<String>,
        forward_to: impl Into<String>,
    ) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
            },
            spec: DnsZoneSpec {
                zone_name: zone_name.into(),
                forward_to: forward_to.into(),
            },
        }
    }

    pub fn key(&self) -> ReconcileKey {
        ReconcileKey::from_parts(&self.metadata.namespace, &self.metadata.name)
    }

    /// Converts the resource into forwarding configuration.
    ///
    /// Only `spec.zoneName` and `spec.forwardTo` are read.
    pub fn to_desired_config(&self) -> Result<DesiredConfig, DomainError> {
        if self.kind != DNS_ZONE_KIND {
            return Err(DomainError::UnsupportedKind(self.kind.clone()));
        }

        let from = ZoneName::parse(&self.spec.zone_name).map_err(|e| {
            DomainError::InvalidResource {
                key: self.key().to_string(),
                reason: e.to_string(),
            }
        })?;

        let forward_to = self.spec.forward_to.trim();
        if forward_to.is_empty() {
            return Err(DomainError::InvalidResource {
                key: self.key().to_string(),
                reason: "forwardTo cannot be empty".to_string(),
            });
        }

        Ok(DesiredConfig::new(from, vec![forward_to.to_string()]))
    }
}

fn default_api_version() -> String {
    DNS_ZONE_API_VERSION.to_string()
}

fn default_kind() -> String {
    DNS_ZONE_KIND.to_string()
}
