//! Transform errors.
//!
//! Every malformed construct aborts the whole transform with exactly one
//! [`TransformError`]. There is no warning tier and no recovery.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a transform failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Unterminated literal or comment, invalid escape, illegal character.
    Lexical,
    /// Unbalanced brackets, mismatched tags, bad import/export shape, ...
    Structural,
    /// Reading a source file or writing an output failed.
    Io,
}

/// A fatal transform error: what went wrong, where, and in which file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("SyntaxError: {message}\nline:{line}, {path}")]
pub struct TransformError {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based source line.
    pub line: u32,
    pub path: String,
}

impl TransformError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: u32, path: &str) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            path: path.to_string(),
        }
    }

    pub fn lexical(message: impl Into<String>, line: u32, path: &str) -> Self {
        Self::new(ErrorKind::Lexical, message, line, path)
    }

    pub fn structural(message: impl Into<String>, line: u32, path: &str) -> Self {
        Self::new(ErrorKind::Structural, message, line, path)
    }

    pub fn io(err: &std::io::Error, path: &str) -> Self {
        Self::new(ErrorKind::Io, err.to_string(), 0, path)
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_line_and_path() {
        let err = TransformError::structural("Unexpected token", 3, "app.jsx");
        assert_eq!(
            err.to_string(),
            "SyntaxError: Unexpected token\nline:3, app.jsx"
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let err = TransformError::lexical("Unterminated string", 1, "a.js");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "lexical");
        assert_eq!(json["line"], 1);
        assert_eq!(json["path"], "a.js");
    }
}
