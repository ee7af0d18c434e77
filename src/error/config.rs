use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid boolean '{value}'. Use true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Invalid sleep check interval '{value}': {source}")]
    InvalidCheckInterval {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Sleep check interval must be > 0.")]
    CheckIntervalZero,
}
