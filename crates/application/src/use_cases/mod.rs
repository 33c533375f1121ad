pub mod zones;

pub use zones::{ReconcileOutcome, ReconcileZoneUseCase, StopAllZonesUseCase};
