// Application state module
// Immutable state shared by every connection

use std::path::PathBuf;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Data directory, resolved once at startup
    pub data_dir: PathBuf,
}

impl AppState {
    pub const fn new(config: Config, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }
}
