use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::RunConfigFile;

/// Loads a configuration file from the provided path or the default
/// `tablepace.toml` next to the working directory.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<RunConfigFile>> {
    if let Some(path) = path {
        let path = PathBuf::from(path);
        return Ok(Some(load_config_file(&path)?));
    }

    let toml_path = PathBuf::from("tablepace.toml");
    if toml_path.exists() {
        return Ok(Some(load_config_file(&toml_path)?));
    }

    Ok(None)
}

pub(crate) fn load_config_file(path: &Path) -> AppResult<RunConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    toml::from_str(&content).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        })
    })
}
