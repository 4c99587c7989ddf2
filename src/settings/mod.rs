//! Configuration for the sheetwiz client.
//!
//! Settings live in `~/.sheetwiz/settings.toml`. See `schema` for the
//! structure and `loader` for load/save/interpolation behavior.

mod loader;
mod schema;

pub use loader::{settings_path, SettingsManager};
pub use schema::{EngineSettings, SheetwizSettings, StorageSettings};
