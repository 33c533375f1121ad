pub mod rate_limiter;
pub mod work_queue;
pub mod zone_controller;

pub use rate_limiter::ExponentialBackoff;
pub use work_queue::WorkQueue;
pub use zone_controller::ZoneController;
