//! Unified error types for docfill.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docfill operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific file or directory
    #[error("{}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Stream or part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Picture could not be decoded or is not a supported format
    #[error("Image error: {0}")]
    Image(String),

    /// Spreadsheet content could not be interpreted
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Rule set or length configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An input file (spreadsheet, template, rules) could not be used
    #[error("{}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach a path to an IO error.
    pub(crate) fn at_path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Path {
            path: path.into(),
            source,
        }
    }

    /// Tie an error to the input file it came from.
    pub(crate) fn for_input(path: impl Into<PathBuf>, source: impl Into<Error>) -> Self {
        Error::Input {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}

/// Result type for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;
