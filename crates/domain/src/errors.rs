use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid zone name: {0}")]
    InvalidZoneName(String),

    #[error("Invalid upstream address: {0}")]
    InvalidUpstream(String),

    #[error("Unsupported object type: {0}")]
    UnsupportedKind(String),

    #[error("Invalid DnsZone {key}: {reason}")]
    InvalidResource { key: String, reason: String },

    #[error("Resource cache lookup failed for {0}")]
    CacheLookup(String),

    #[error("Handler factory failed for zone {zone}: {reason}")]
    HandlerFactory { zone: String, reason: String },

    #[error("Handler {handler} failed to start: {reason}")]
    HandlerStart { handler: String, reason: String },

    #[error("Handler {handler} failed to stop: {reason}")]
    HandlerStop { handler: String, reason: String },

    #[error("No handler for {0}")]
    NotHandled(String),

    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Query to {0} timed out")]
    QueryTimeout(String),

    #[error("All upstreams failed for {0}")]
    UpstreamsExhausted(String),

    #[error("Watch failed: {0}")]
    WatchFailed(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Shutdown already in progress")]
    ShutdownInProgress,
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
