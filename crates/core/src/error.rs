//! Error types for Folio operations.
//!
//! This module defines the main error type [`FolioError`] which represents
//! every failure the library surfaces: fetching, parsing, extraction and
//! document writing.
//!
//! Extraction itself is forgiving. Missing metadata, unresolvable images and
//! malformed subtrees are absorbed inside the pipeline; the only extraction
//! failure that reaches callers is [`FolioError::NoContent`].
//!
//! # Example
//!
//! ```rust
//! use folio_core::{FolioError, Result};
//!
//! fn require_markup(html: &str) -> Result<&str> {
//!     if html.trim().is_empty() {
//!         return Err(FolioError::NoContent);
//!     }
//!     Ok(html)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction, fetching and document output.
///
/// # Example
///
/// ```rust
/// use folio_core::{FolioError, extract};
///
/// match extract("<html><body><nav>Menu</nav></body></html>") {
///     Ok(result) => println!("Extracted {} blocks", result.blocks.len()),
///     Err(FolioError::NoContent) => println!("No article body found"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum FolioError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// No content root could be located in the document.
    ///
    /// This is the only extraction error. Callers should not attempt to
    /// render a partial document when they receive it.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Errors from the zip container while assembling a document.
    #[error("Failed to assemble document archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization errors.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An image could not be staged for embedding.
    #[error("Image rejected: {0}")]
    Image(String),

    /// Headless browser rendering failed.
    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Result type alias for FolioError.
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FolioError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_http_status_error() {
        let err = FolioError::HttpStatus { status: 404, url: "https://example.com/a".to_string() };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("https://example.com/a"));
    }

    #[test]
    fn test_timeout_error() {
        let err = FolioError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FolioError = io.into();
        assert!(matches!(err, FolioError::WriteError(_)));
    }
}
