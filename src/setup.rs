//! One-time per-run global setup.
//!
//! Many worker threads (and several call sites) may race to trigger setup;
//! the first caller performs it, everyone else observes the cached result.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::broker::filename::repo_prefix;
use crate::config::{DEFAULT_BROKER_HOST, RunConfig};

/// Run-wide facts resolved exactly once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupState {
    /// Local machine name, for diagnostic tags and log correlation.
    pub hostname: String,
    /// Broker host actually in effect, defaulted when none was configured.
    pub broker_host: String,
    /// Canonical filename prefix derived from the repository identity.
    pub repo_prefix: Option<String>,
}

impl SetupState {
    /// Copies the defaulted broker host back into a config so a
    /// [`crate::broker::BrokerClient`] can be built from it.
    pub fn apply_to(&self, config: &mut RunConfig) {
        if config
            .broker_host
            .as_deref()
            .is_none_or(|host| host.trim().is_empty())
        {
            config.broker_host = Some(self.broker_host.clone());
        }
    }
}

static SETUP: OnceCell<SetupState> = OnceCell::new();

/// Runs the global setup once per process; redundant calls from any thread
/// return the already-computed state.
pub fn ensure_global_setup(config: &RunConfig) -> &'static SetupState {
    SETUP.get_or_init(|| {
        let hostname = detect_hostname();
        let broker_host = config
            .broker_host
            .clone()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| {
                info!("No broker host configured, defaulting to {DEFAULT_BROKER_HOST}");
                DEFAULT_BROKER_HOST.to_owned()
            });
        let prefix = config.repo_name.as_deref().map(repo_prefix);
        info!(
            "Global setup complete: broker={broker_host} hostname={hostname} prefix={}",
            prefix.as_deref().unwrap_or("<none>")
        );
        SetupState {
            hostname,
            broker_host,
            repo_prefix: prefix,
        }
    })
}

fn detect_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}
