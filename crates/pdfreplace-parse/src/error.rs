//! Error types for the parsing, rewriting and embedding layers.
//!
//! [`BackendError`] is derived with [`thiserror`] and converts into the
//! crate-independent [`PdfError`].

use pdfreplace_core::PdfError;
use thiserror::Error;

/// Error type for lopdf-backed document operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A font program or font dictionary could not be used.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// Error serializing content streams or the rebuilt document.
    #[error("write error: {0}")]
    Write(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::Font(msg) => PdfError::FontError(msg),
            BackendError::Interpreter(msg) => PdfError::InterpreterError(msg),
            BackendError::Write(msg) => PdfError::Other(format!("write error: {msg}")),
            BackendError::Core(e) => e,
        }
    }
}
