use crate::config::ConfigError;
use docview_decode::DecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a file is neither a PDF nor a DOCX document.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Please select a PDF or DOCX file only.";

/// Errors surfaced by a [`DocumentSession`](crate::DocumentSession).
///
/// None of them is fatal: the session stays usable after every one.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("{}", UNSUPPORTED_FORMAT_MESSAGE)]
    UnsupportedFormat { name: String, mime: Option<String> },

    #[error("failed to decode document: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ViewerResult<T> = Result<T, ViewerError>;
