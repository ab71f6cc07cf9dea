//! # Assembly Errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling OBJ/MTL output.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A named color that the palette does not define.
    #[error("color `{0}` is not defined in the palette")]
    UnknownColor(String),

    /// An output file could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssembleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for assembly operations.
pub type AssembleResult<T> = Result<T, AssembleError>;
