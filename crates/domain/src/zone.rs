use crate::DomainError;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Canonical zone name: ASCII lower-case with exactly one trailing dot.
///
/// The root zone is represented as `"."`. Uses `Arc<str>` so that registry
/// lookups, log fields and config values share one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneName(Arc<str>);

impl ZoneName {
    /// Canonicalizes any input, including empty strings (which map to the root).
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            return Self(Arc::from("."));
        }
        let mut name = trimmed.to_ascii_lowercase();
        name.push('.');
        Self(Arc::from(name))
    }

    /// Like [`ZoneName::normalize`] but rejects names that cannot be a zone.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidZoneName(
                "zone name cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > 253 {
            return Err(DomainError::InvalidZoneName(format!(
                "'{}' exceeds 253 characters",
                trimmed
            )));
        }
        if trimmed != "." && trimmed.trim_end_matches('.').split('.').any(|l| l.is_empty()) {
            return Err(DomainError::InvalidZoneName(format!(
                "'{}' contains an empty label",
                trimmed
            )));
        }
        Ok(Self::normalize(trimmed))
    }

    pub fn root() -> Self {
        Self(Arc::from("."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == "."
    }

    /// True when `name` equals this zone or lies below it.
    ///
    /// `name` is expected to be normalized already.
    pub fn contains(&self, name: &str) -> bool {
        if self.is_root() {
            return true;
        }
        match name.strip_suffix(self.as_str()) {
            Some("") => true,
            Some(prefix) => prefix.ends_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ZoneName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `ZoneName` be queried with an already-normalized `&str`.
impl Borrow<str> for ZoneName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stable identity of one watched resource (`namespace/name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconcileKey(Arc<str>);

impl ReconcileKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Builds the key the same way a namespaced object store does:
    /// `namespace/name`, or just `name` for cluster-scoped objects.
    pub fn from_parts(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self(Arc::from(name))
        } else {
            Self(Arc::from(format!("{}/{}", namespace, name)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReconcileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReconcileKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Forwarding configuration derived from a single `DnsZone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredConfig {
    pub from: ZoneName,
    pub to: Vec<String>,
}

impl DesiredConfig {
    pub fn new(from: ZoneName, to: Vec<String>) -> Self {
        Self { from, to }
    }
}
