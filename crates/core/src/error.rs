//! Error types for newsdesk operations.
//!
//! [`NewsdeskError`] covers everything that can stop a single article from
//! being produced: fetch failures, unusable markup, empty or too-short text.
//! [`RuleApplicationError`] is the per-rule failure of the DOM pruner, which
//! is collected and logged but never fails a pipeline run.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::{NewsdeskError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(NewsdeskError::NoContent);
//!     }
//!     Ok(text)
//! }
//! # assert!(require_text("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "feed")]
use sxd_xpath::ExecutionError;

/// Main error type for fetching and extraction.
#[derive(Error, Debug)]
pub enum NewsdeskError {
    /// Transport-level failure from reqwest (DNS, connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The upstream server answered with a non-2xx status.
    ///
    /// `status` is mirrored verbatim to callers of the pipeline.
    #[error("Upstream responded with {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML could not be parsed or a selector was invalid.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The best content candidate scored below the configured minimum.
    #[error("Content is not readable (score {score} below threshold {threshold})")]
    NotReadable { score: f64, threshold: f64 },

    /// No content block could be found, or it rendered to empty text.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// Cleaned text is shorter than the configured minimum.
    #[error("Article text too short ({length} characters, minimum {minimum})")]
    TooShort { length: usize, minimum: usize },

    /// A text strip rule failed to compile.
    #[error("Invalid strip rule `{name}`: {reason}")]
    InvalidRule { name: String, reason: String },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading local input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// News sitemap could not be parsed or queried.
    #[error("Sitemap error: {0}")]
    Sitemap(String),
}

#[cfg(feature = "feed")]
impl From<ExecutionError> for NewsdeskError {
    fn from(err: ExecutionError) -> Self {
        NewsdeskError::Sitemap(err.to_string())
    }
}

impl NewsdeskError {
    /// Whether this error happened while obtaining the HTML rather than
    /// while turning it into an article.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            NewsdeskError::HttpError(_)
                | NewsdeskError::HttpStatus { .. }
                | NewsdeskError::Timeout { .. }
                | NewsdeskError::InvalidUrl(_)
        )
    }
}

/// A structural rule that could not be applied.
///
/// Produced by [`crate::prune_html`] and reported in
/// [`crate::PruneReport::skipped`]; the remaining rules still run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule `{selector}` skipped: {reason}")]
pub struct RuleApplicationError {
    pub selector: String,
    pub reason: String,
}

/// Result type alias for NewsdeskError.
pub type Result<T> = std::result::Result<T, NewsdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NewsdeskError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_http_status_display() {
        let err = NewsdeskError::HttpStatus { status: 404, reason: "Not Found".to_string() };
        assert_eq!(err.to_string(), "Upstream responded with 404 Not Found");
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_too_short_display() {
        let err = NewsdeskError::TooShort { length: 120, minimum: 300 };
        assert!(err.to_string().contains("120"));
        assert!(err.to_string().contains("300"));
        assert!(!err.is_fetch_error());
    }

    #[test]
    fn test_rule_application_error_display() {
        let err = RuleApplicationError { selector: "[[".to_string(), reason: "bad selector".to_string() };
        assert_eq!(err.to_string(), "rule `[[` skipped: bad selector");
    }
}
