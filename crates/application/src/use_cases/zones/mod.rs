pub mod reconcile_zone;
pub mod stop_all_zones;

pub use reconcile_zone::{ReconcileOutcome, ReconcileZoneUseCase};
pub use stop_all_zones::StopAllZonesUseCase;
