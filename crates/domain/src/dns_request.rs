use std::sync::Arc;

/// A DNS query as seen by zone handlers.
///
/// `name` is the question name, `wire` the original request bytes which
/// forwarding handlers relay untouched.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub name: Arc<str>,
    pub wire: Arc<[u8]>,
}

impl DnsRequest {
    pub fn new(name: impl Into<Arc<str>>, wire: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            wire: wire.into(),
        }
    }

    /// Question name lower-cased with a single trailing dot.
    pub fn normalized_name(&self) -> String {
        let mut name = self.name.trim_end_matches('.').to_ascii_lowercase();
        name.push('.');
        name
    }
}

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub wire: Vec<u8>,
    /// Upstream that produced the answer, when forwarded.
    pub upstream: Option<Arc<str>>,
}

impl DnsResponse {
    pub fn new(wire: Vec<u8>) -> Self {
        Self {
            wire,
            upstream: None,
        }
    }

    pub fn from_upstream(wire: Vec<u8>, upstream: Arc<str>) -> Self {
        Self {
            wire,
            upstream: Some(upstream),
        }
    }
}
