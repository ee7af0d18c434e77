//! Run configuration consumed by the pacing scheduler and the broker client.
mod loader;
mod types;


pub use loader::load_config;
pub use types::RunConfigFile;

use std::time::Duration;

use crate::error::{AppResult, ConfigError};

pub const DEFAULT_BROKER_HOST: &str = "sts.default:8080";
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Effective configuration for one test run.
///
/// Built from defaults, optionally a TOML file, then `TABLEPACE_*`
/// environment overrides, in that order.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Broker host, `host[:port]` without a scheme.
    pub broker_host: Option<String>,
    /// Select https instead of http. The scheme is never inferred from the
    /// host string.
    pub use_https: bool,
    /// Accept self-signed/internally-issued broker certificates.
    pub trust_all_certs: bool,
    /// Verify the broker certificate's host name.
    pub verify_hostname: bool,
    /// Source-control repository identity used for filename prefixing.
    pub repo_name: Option<String>,
    /// Skip pacing waits entirely.
    pub debug: bool,
    /// Default pacing spec, `"<seconds>"` or `"<min>,<max>"`.
    pub pacing: Option<String>,
    /// Slice length for the interruptible pacing sleep.
    pub check_interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            broker_host: None,
            use_https: false,
            trust_all_certs: true,
            verify_hostname: false,
            repo_name: None,
            debug: false,
            pacing: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl RunConfig {
    /// Loads configuration from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read/parsed or an override
    /// value is malformed.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(file) = load_config(path)? {
            config.apply_file(file);
        }
        config.apply_env()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: RunConfigFile) {
        if let Some(host) = file.broker_host {
            self.broker_host = Some(host);
        }
        if let Some(https) = file.use_https {
            self.use_https = https;
        }
        if let Some(trust) = file.trust_all_certs {
            self.trust_all_certs = trust;
        }
        if let Some(verify) = file.verify_hostname {
            self.verify_hostname = verify;
        }
        if let Some(repo) = file.repo_name {
            self.repo_name = Some(repo);
        }
        if let Some(debug) = file.debug {
            self.debug = debug;
        }
        if let Some(pacing) = file.pacing {
            self.pacing = Some(pacing);
        }
        if let Some(ms) = file.check_interval_ms {
            self.check_interval = Duration::from_millis(ms.max(1));
        }
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(host) = std::env::var("TABLEPACE_HOST")
            && !host.trim().is_empty()
        {
            self.broker_host = Some(host.trim().to_owned());
        }
        if let Ok(value) = std::env::var("TABLEPACE_HTTPS") {
            self.use_https = parse_bool(&value)?;
        }
        if let Ok(value) = std::env::var("TABLEPACE_TRUST_ALL") {
            self.trust_all_certs = parse_bool(&value)?;
        }
        if let Ok(value) = std::env::var("TABLEPACE_VERIFY_HOSTNAME") {
            self.verify_hostname = parse_bool(&value)?;
        }
        if let Ok(repo) = std::env::var("TABLEPACE_REPO")
            && !repo.trim().is_empty()
        {
            self.repo_name = Some(repo.trim().to_owned());
        }
        if let Ok(value) = std::env::var("TABLEPACE_DEBUG") {
            self.debug = parse_bool(&value)?;
        }
        if let Ok(pacing) = std::env::var("TABLEPACE_PACING")
            && !pacing.trim().is_empty()
        {
            self.pacing = Some(pacing.trim().to_owned());
        }
        if let Ok(value) = std::env::var("TABLEPACE_CHECK_INTERVAL_MS") {
            self.check_interval = parse_check_interval(&value)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            value: s.to_owned(),
        }),
    }
}

fn parse_check_interval(s: &str) -> Result<Duration, ConfigError> {
    let millis: u64 =
        s.trim()
            .parse()
            .map_err(|err| ConfigError::InvalidCheckInterval {
                value: s.to_owned(),
                source: err,
            })?;
    if millis == 0 {
        return Err(ConfigError::CheckIntervalZero);
    }
    Ok(Duration::from_millis(millis))
}
