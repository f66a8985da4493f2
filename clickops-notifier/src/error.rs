use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} is not a JSON array of strings: {source}")]
    InvalidAccounts {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Rules(#[from] clickops_filter::RuleError),
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read parameter {name}: {source}")]
    Request {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("parameter {0} has no value")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object storage request failed: {0}")]
    Storage(#[source] BoxError),

    #[error("failed to decompress log object: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("log object is not a valid CloudTrail document: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(reqwest::StatusCode),
}

/// Errors that fail the whole invocation, leaving redelivery to the queue.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("could not resolve webhook url: {0}")]
    Webhook(#[from] SecretError),

    #[error("error getting object {key} from bucket {bucket}: {source}")]
    Retrieval {
        bucket: String,
        key: String,
        #[source]
        source: FetchError,
    },
}
