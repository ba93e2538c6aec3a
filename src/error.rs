//! Centralized error types for listunpack.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the listunpack library.
#[derive(Error, Debug)]
pub enum UnpackError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input log directory does not exist or is not a directory.
    #[error("Log directory not found: {0}")]
    LogDirNotFound(PathBuf),

    /// A transcript could not be parsed into any header/body structure.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The Date header is missing or matches neither accepted format.
    ///
    /// This skips the whole message: no manifest row is written, but any
    /// part files already extracted for it are left in place.
    #[error("Unparsable date: '{0}'")]
    UnparsableDate(String),

    /// A single part's payload could not be decoded from its declared
    /// transfer encoding. The part is skipped; siblings continue.
    #[error("Part decode failure: {0}")]
    PartDecode(String),
}

/// Convenience alias for `Result<T, UnpackError>`.
pub type Result<T> = std::result::Result<T, UnpackError>;

impl UnpackError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `UnpackError`
/// when no path context is available (rare; prefer `UnpackError::io`).
impl From<std::io::Error> for UnpackError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
