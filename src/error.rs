//! Error types for the lectsave library.

use std::io;
use thiserror::Error;

/// Result type alias for lectsave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while harvesting lectures.
///
/// Only [`Error::Authentication`] and [`Error::NoCourses`] abort a run.
/// Everything else is reported per lecture or per course and the
/// traversal moves on.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing a PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A rendered or merged file does not start with the PDF header.
    #[error("Not a PDF file: {0}")]
    NotPdf(String),

    /// The browser driver reported a failure.
    #[error("Browser error: {0}")]
    Browser(String),

    /// A wait ran past its deadline.
    #[error("Timed out after {0} ms waiting for {1}")]
    Timeout(u128, String),

    /// Logging into the portal failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The course list could not be loaded or was empty.
    #[error("No courses available: {0}")]
    NoCourses(String),

    /// The resume point is invalid.
    #[error("Invalid resume point: {0}")]
    InvalidResume(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::NoCourses(_))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}
