//! Miette-based error diagnostics for CLI error presentation.
//!
//! Configuration parse failures are rendered against the file content with
//! a label on the offending span.

use std::ops::Range;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(parlay::config))]
pub struct ConfigError {
    /// Human-readable error message.
    pub message: String,

    /// Source content (typically the configuration file).
    #[source_code]
    pub src: String,

    /// Byte offset and length of the problematic region.
    #[label("here")]
    pub span: SourceSpan,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    /// Create a new configuration error with source location.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: src.into(),
            span: (offset, len).into(),
            help: None,
        }
    }

    /// Build a diagnostic from a TOML parse failure.
    #[must_use]
    pub fn from_toml(err: &toml::de::Error, src: &str) -> Self {
        let Range { start, end } = err.span().unwrap_or(0..0);
        Self::new(err.message(), src, start, end.saturating_sub(start))
            .with_help("see config.toml.example for the supported sections")
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Storage failure surfaced to the operator.
///
/// Carries only the public message; the detail goes to the log.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(parlay::storage),
    help("the operation was not applied and is safe to retry")
)]
pub struct StorageError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_point_at_the_bad_span() {
        let src = "[database]\nurl = \n";
        let err = toml::from_str::<toml::Value>(src).unwrap_err();

        let diagnostic = ConfigError::from_toml(&err, src);

        assert!(diagnostic.span.offset() <= src.len());
        assert!(diagnostic.help.is_some());
        assert_eq!(diagnostic.src, src);
    }
}
