//! Project configuration and vault discovery.

pub mod discovery;
pub mod settings;

pub use discovery::{discover_vault, DiscoveredVault};
pub use settings::Settings;
