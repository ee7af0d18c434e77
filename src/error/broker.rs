use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Broker host is not configured.")]
    MissingHost,
    #[error("Invalid broker URL for host '{host}': {source}")]
    InvalidHostUrl {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
