use thiserror::Error;

/// Failures a caller of the page host needs to tell apart.
#[derive(Debug, Error)]
pub enum PageError {
    /// The sheet came from another origin; its rules apply but cannot be read.
    #[error("stylesheet {href} is cross-origin and cannot be read")]
    CrossOriginStylesheet { href: String },

    #[error("no stylesheet at index {0}")]
    UnknownStylesheet(usize),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("invalid layout description: {0}")]
    Layout(#[from] serde_json::Error),
}
