//! Configuration: run settings, application discovery and manifests.
pub mod discovery;
pub mod manifest;
pub mod settings;
pub mod toml_loader;

pub use discovery::discover_apps;
pub use manifest::{MANIFEST_FILE, Manifest};
pub use settings::{SETTINGS_FILE, Settings};
