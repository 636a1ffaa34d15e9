use std::io;

use page_handler::PageError;
use thiserror::Error;

/// Failures of an assistant round-trip. The display text is what the chat
/// shows after `Error: `.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("API Key not found")]
    KeyNotFound,

    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with an error body; the message is verbatim.
    #[error("{message}")]
    Api { message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid image attachment: {0}")]
    InvalidAttachment(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] PageError),

    #[error("not a downloadable URL: {0}")]
    BadUrl(String),
}
