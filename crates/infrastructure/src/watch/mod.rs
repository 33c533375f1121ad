pub mod manifest;
pub mod memory;

pub use manifest::{Manifest, ManifestEntry, ManifestWatcher};
pub use memory::InMemoryResourceWatcher;
