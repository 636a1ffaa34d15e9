use std::io;

use thiserror::Error;

/// Why an edit could not be applied. Both kinds are recoverable: the page
/// is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no element is selected or hovered to apply the edit to")]
    NoTarget,

    #[error("edit block carries none of styles, text, html or classes")]
    EmptyDescriptor,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no settings directory available on this platform")]
    NoConfigDir,
}
