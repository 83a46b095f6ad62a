//! Error types for newsdesk operations.
//!
//! This module defines the main error type [`NewsdeskError`] which represents
//! every way a generation run can fail: choosing the input, reading a file,
//! fetching a page, calling the model, and parsing its reply.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::{NewsdeskError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(NewsdeskError::MalformedResponse("empty reply".to_string()));
//!     }
//!     Ok(text)
//! }
//! # assert!(require_text("  ").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the generation pipeline.
///
/// Every variant is reported synchronously to the caller; nothing is retried.
/// Input and configuration problems carry an actionable hint through
/// [`NewsdeskError::suggestion`].
///
/// # Example
///
/// ```rust
/// use newsdesk_core::NewsdeskError;
///
/// let err = NewsdeskError::InvalidInputSelection { both: true };
/// assert!(err.to_string().contains("--input-file"));
/// assert!(err.suggestion().is_some());
/// ```
#[derive(Error, Debug)]
pub enum NewsdeskError {
    /// Both or neither of the file and URL inputs were selected.
    #[error("{}", selection_message(.both))]
    InvalidInputSelection { both: bool },

    /// The input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The input path exists but is not a regular file.
    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),

    /// The input file is empty after trimming whitespace.
    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    /// The input file cannot be read with the current permissions.
    #[error("Permission denied reading {0}")]
    PermissionDenied(PathBuf),

    /// The input file is not valid UTF-8 text.
    #[error("File is not valid UTF-8 text: {0}")]
    InvalidEncoding(PathBuf),

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, has no host, or uses a scheme
    /// other than http/https.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page could not be retrieved (DNS, connection, TLS, body read).
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Failed to fetch {url}: server answered {status}")]
    HttpStatus { url: String, status: u16 },

    /// Request timeout.
    #[error("Request to {url} timed out after {timeout} seconds")]
    Timeout { url: String, timeout: u64 },

    /// Nothing readable was left after stripping the page markup.
    #[error("No text could be extracted from {0}")]
    EmptyContent(String),

    /// No credential is configured for the model API.
    #[error("No API key configured for the language model")]
    MissingApiKey,

    /// The model call failed (transport, quota, empty candidate list).
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The model reply does not contain a usable title or body.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The custom instructions were rejected.
    #[error("Invalid instructions: {0}")]
    InvalidInstructions(String),

    /// Configuration values that cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File write and directory errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NewsdeskError {
    /// Returns an actionable hint for errors the user can fix.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInputSelection { both: true } => Some("pass only one of --input-file or --url"),
            Self::InvalidInputSelection { both: false } => {
                Some("pass --input-file or --url, or set NEWS_INPUT_FILE in the environment or .env")
            }
            Self::FileNotFound(_) => Some("create the file or pass another path with --input-file"),
            Self::NotAFile(_) => Some("point --input-file at a regular text file, not a directory"),
            Self::EmptyFile(_) => Some("write the source text into the file before generating"),
            Self::PermissionDenied(_) => Some("check the file permissions or copy it somewhere readable"),
            Self::InvalidEncoding(_) => Some("save the file as UTF-8 plain text"),
            Self::InvalidUrl(_) => Some("use a full address starting with http:// or https://"),
            Self::Fetch { .. } | Self::Timeout { .. } => {
                Some("check your connection and that the address opens in a browser")
            }
            Self::HttpStatus { .. } => Some("verify the address is public and still online"),
            Self::EmptyContent(_) => Some("save the page text to a file and use --input-file instead"),
            Self::MissingApiKey => Some("set GOOGLE_API_KEY in the environment or in a .env file"),
            Self::InvalidInstructions(_) => Some("shorten the instructions to at most 1000 characters"),
            Self::Config(_) => Some("review the NEWS_* variables in the environment or .env"),
            Self::Generation(_) | Self::MalformedResponse(_) | Self::Io(_) => None,
        }
    }
}

fn selection_message(both: &bool) -> &'static str {
    if *both {
        "--input-file and --url cannot be used at the same time"
    } else {
        "no input selected: pass --input-file or --url"
    }
}

/// Result type alias for NewsdeskError.
///
/// This is a convenience alias for `std::result::Result<T, NewsdeskError>`.
pub type Result<T> = std::result::Result<T, NewsdeskError>;
