use std::path::PathBuf;

use thiserror::Error;

use crate::images::FetchError;

/// Application-level error type.
///
/// Per-image problems never surface here: the pipeline turns them into skipped
/// images. `DeckError` covers the run as a whole.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeckError {
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        DeckError::Script {
            line,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeckError::Io {
            path: path.into(),
            source,
        }
    }
}
