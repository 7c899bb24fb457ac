// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable that overrides `[registry].root`.
pub const ROOT_ENV_VAR: &str = "JOBWATCH_ROOT";

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; no environment overrides and no
/// semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, apply environment overrides and validate.
///
/// This is the entry point the binary uses. The environment is read exactly
/// once, here; everything downstream receives the resulting `ConfigFile`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    apply_root_override(&mut raw_config, std::env::var(ROOT_ENV_VAR).ok());
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Replace `[registry].root` with `value` when it is set and non-blank.
pub fn apply_root_override(raw: &mut RawConfigFile, value: Option<String>) {
    if let Some(root) = value.filter(|v| !v.trim().is_empty()) {
        info!(root = %root, "registry root overridden by {ROOT_ENV_VAR}");
        raw.registry.root = PathBuf::from(root);
    }
}
