use serde::Deserialize;

/// On-disk shape of the optional `tablepace.toml` file. Every field is
/// optional; unset fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfigFile {
    pub broker_host: Option<String>,
    pub use_https: Option<bool>,
    pub trust_all_certs: Option<bool>,
    pub verify_hostname: Option<bool>,
    pub repo_name: Option<String>,
    pub debug: Option<bool>,
    pub pacing: Option<String>,
    pub check_interval_ms: Option<u64>,
}
