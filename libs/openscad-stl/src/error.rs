//! # STL Errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent an artifact from being read at all.
///
/// Malformed facets are not errors: they are skipped and the rest of the
/// artifact is still imported.
#[derive(Debug, Error)]
pub enum StlError {
    /// The artifact could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A binary artifact shorter than its header.
    #[error("binary STL too short: {len} bytes (need at least {min})")]
    TooShort { len: usize, min: usize },

    /// The binary record stream could not be opened.
    #[error("failed to decode binary STL: {0}")]
    Decode(#[source] std::io::Error),
}

impl StlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for STL operations.
pub type StlResult<T> = Result<T, StlError>;
