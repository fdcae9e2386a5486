//! Unified error types for pcapi.
//!
//! Only opening the store is allowed to surface one of these to a caller of
//! the lookup path; everything else is logged and degraded to a cache miss.

use tokio_rusqlite::rusqlite;

/// Unified error types for the pcapi core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input, such as an empty cache key.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The backing store could not be opened.
    #[error("CACHE_OPEN_FAILED: {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cached bytes could not be turned back into an entry.
    #[error("DECODE_FAILED: {0}")]
    Decode(String),

    /// An entry could not be serialized for storage.
    #[error("ENCODE_FAILED: {0}")]
    Encode(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
