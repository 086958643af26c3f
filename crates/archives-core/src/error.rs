//! Errors raised while loading, parsing and discovering source files.
//!
//! Linting itself never fails; every rule predicate is total.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for archives operations.
pub type Result<T> = std::result::Result<T, ArchivesError>;

/// Errors that can occur outside the lint walk.
#[derive(Debug, Error, Diagnostic)]
pub enum ArchivesError {
    /// The source file does not exist.
    #[error("file not found: {}", path.display())]
    #[diagnostic(code(archives::file_not_found))]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(code(archives::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The source text is not valid Python.
    #[error("{}:{line}:{column}: {message}", path.display())]
    #[diagnostic(
        code(archives::parse),
        help("fix the syntax error or pass --ignore-exceptions to skip unparsable files")
    )]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Line of the first error (1-indexed).
        line: usize,
        /// Column of the first error (0-indexed).
        column: usize,
        /// Parser message.
        message: String,
    },

    /// An include or exclude regex does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    #[diagnostic(code(archives::invalid_pattern))]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Regex compile error.
        #[source]
        source: regex::Error,
    },

    /// An `extend_exclude` glob does not compile.
    #[error("invalid glob '{pattern}': {message}")]
    #[diagnostic(code(archives::invalid_glob))]
    InvalidGlob {
        /// The offending glob.
        pattern: String,
        /// Glob compile error.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(archives::config))]
    Config(#[from] ConfigError),
}

impl ArchivesError {
    /// Returns true for errors a run may survive under a lenient parse
    /// policy.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_is_flake8_like() {
        let err = ArchivesError::Parse {
            path: PathBuf::from("pkg/broken.py"),
            line: 3,
            column: 7,
            message: "invalid syntax".to_string(),
        };
        assert_eq!(err.to_string(), "pkg/broken.py:3:7: invalid syntax");
        assert!(err.is_parse_error());
    }

    #[test]
    fn invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ArchivesError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern '('"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_parse_error());
    }
}
