//! Error types for the caption passes.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while collecting or rewriting book images.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image {key} on page {page} is not in the image registry")]
    MissingImage { key: String, page: String },

    #[error("Page {path}: {source}")]
    Page {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the page path to an error raised while processing that page.
    pub(crate) fn in_page(self, path: &str) -> Self {
        match self {
            // Already carries a page.
            e @ (Error::Page { .. } | Error::MissingImage { .. }) => e,
            e => Error::Page {
                path: path.to_string(),
                source: Box::new(e),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
