//! User config file source: `<config dir>/grid/config.toml`, optional.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;

/// Platform config file path, if a home directory can be determined.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "grid")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the user config file to builder when it can be located.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match config_path() {
        Some(path) => Ok(builder.add_source(File::from(path).required(false))),
        None => Ok(builder),
    }
}
