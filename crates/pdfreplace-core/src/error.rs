//! Error type shared by every pdfreplace crate.

use std::fmt;

/// Fatal error types for PDF processing.
///
/// [`PdfError::InvalidInput`] is the one kind surfaced to callers of the
/// replacement and page-collection operations; its message names the
/// offending field and, where relevant, the accepted bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading or writing data.
    IoError(String),
    /// Error loading, measuring or embedding a font program.
    FontError(String),
    /// Error during content stream interpretation or rewriting.
    InterpreterError(String),
    /// The request itself is malformed (bad range, missing text, ...).
    InvalidInput(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl PdfError {
    /// Shorthand for [`PdfError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        PdfError::InvalidInput(msg.into())
    }
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "parse error: {msg}"),
            PdfError::IoError(msg) => write!(f, "I/O error: {msg}"),
            PdfError::FontError(msg) => write!(f, "font error: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "interpreter error: {msg}"),
            PdfError::InvalidInput(msg) => write!(f, "{msg}"),
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}
