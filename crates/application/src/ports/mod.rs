pub mod handler_factory;
pub mod resource_watcher;
pub mod zone_handler;

pub use handler_factory::HandlerFactory;
pub use resource_watcher::{ResourceStore, ResourceWatcher, WatchEvent};
pub use zone_handler::{QueryHandler, ZoneHandler};
