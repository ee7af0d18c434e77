use thiserror::Error;

use super::{BrokerError, ConfigError, PacingError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Pacing error: {0}")]
    Pacing(#[from] PacingError),
    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn pacing<E>(error: E) -> Self
    where
        E: Into<PacingError>,
    {
        error.into().into()
    }

    pub fn broker<E>(error: E) -> Self
    where
        E: Into<BrokerError>,
    {
        error.into().into()
    }
}
