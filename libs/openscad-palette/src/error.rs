//! # Palette Errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a palette.
///
/// Everything except [`PaletteError::Io`] is recoverable: the offending
/// definition is skipped and the rest of the file is still used.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The palette file could not be read.
    #[error("cannot read palette {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition line without `=`.
    #[error("line {line}: expected `name = value`")]
    MissingSeparator { line: usize },

    /// A `#` value that is not 3 or 6 hex digits.
    #[error("line {line}: invalid hex color `{value}`")]
    InvalidHex { line: usize, value: String },

    /// An `rgb(...)` value without three 0-255 integers.
    #[error("line {line}: invalid rgb color `{value}`")]
    InvalidRgb { line: usize, value: String },

    /// A packed integer value that does not parse.
    #[error("line {line}: invalid packed color `{value}`")]
    InvalidPacked { line: usize, value: String },
}

impl PaletteError {
    /// True when the error only affects a single definition.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PaletteError::Io { .. })
    }
}

/// Result type alias for palette operations.
pub type PaletteResult<T> = Result<T, PaletteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PaletteError::InvalidHex {
            line: 3,
            value: "#12".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: invalid hex color `#12`");
        assert!(err.is_recoverable());
    }
}
