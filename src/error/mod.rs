mod app;
mod broker;
mod config;
mod pacing;

pub use app::{AppError, AppResult};
pub use broker::BrokerError;
pub use config::ConfigError;
pub use pacing::PacingError;
