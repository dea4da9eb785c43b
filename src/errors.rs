//! Error types for talking to the resources API

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse resources response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("Resources API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Paper '{0}' has no download link")]
    MissingDownloadTarget(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for PaperError {
    fn from(err: anyhow::Error) -> Self {
        PaperError::Config(err.to_string())
    }
}
