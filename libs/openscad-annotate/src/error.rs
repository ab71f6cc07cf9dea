//! # Annotation Errors
//!
//! Error types for line recognition and variant isolation.

use thiserror::Error;

/// A recognized annotation whose arguments could not be read.
///
/// Recoverable: the scanner reports it and treats the line as plain text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    /// No closing `"` after the opening one.
    #[error("unclosed string in annotation")]
    UnclosedQuote,

    /// No closing `]` after the opening one.
    #[error("unclosed vector in color invocation")]
    UnclosedBracket,

    /// Fewer than three components inside `[...]`.
    #[error("color vector needs 3 components, found {found}")]
    MissingComponents { found: usize },

    /// A component that is not a number.
    #[error("invalid color component `{text}`")]
    InvalidNumber { text: String },
}

/// Errors that abort a single isolation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsolationError {
    /// The brace/semicolon scan reached end of file inside a statement.
    #[error("statement starting on line {} never terminates (group `{group}`, color `{color}`)", .start_line + 1)]
    UnterminatedStatement {
        start_line: usize,
        group: String,
        color: String,
    },

    /// The requested group index does not exist.
    #[error("unknown group index {0}")]
    UnknownGroup(usize),

    /// The requested color index does not exist.
    #[error("unknown color index {0}")]
    UnknownColor(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_reports_one_based_line() {
        let err = IsolationError::UnterminatedStatement {
            start_line: 4,
            group: "main".to_string(),
            color: "red".to_string(),
        };
        assert!(err.to_string().contains("line 5"));
        assert!(err.to_string().contains("`red`"));
    }
}
