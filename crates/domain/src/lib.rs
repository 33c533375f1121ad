//! Ferrous Zones Domain Layer
pub mod config;
pub mod dns_request;
pub mod dns_zone;
pub mod errors;
pub mod zone;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_request::{DnsRequest, DnsResponse};
pub use dns_zone::{DnsZone, DnsZoneSpec, ObjectMeta, DNS_ZONE_API_VERSION, DNS_ZONE_KIND};
pub use errors::DomainError;
pub use zone::{DesiredConfig, ReconcileKey, ZoneName};
