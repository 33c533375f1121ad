//! Configuration for the zone controller
//!
//! - `root`: Main configuration and CLI overrides
//! - `server`: DNS listener binding
//! - `controller`: Workers, namespace scoping and retry backoff
//! - `forward`: Forwarding handler settings
//! - `watch`: Resource manifest source
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod controller;
pub mod errors;
pub mod forward;
pub mod logging;
pub mod root;
pub mod server;
pub mod watch;

pub use controller::ControllerConfig;
pub use errors::ConfigError;
pub use forward::ForwardConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use watch::WatchConfig;
