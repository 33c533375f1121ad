pub mod zone_registry;
pub mod zone_router;

pub use zone_registry::{same_handler, Eviction, ZoneRegistry};
pub use zone_router::ZoneRouter;
