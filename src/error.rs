//! Error types for feedbeat.

use thiserror::Error;

/// Common error type for feedbeat.
#[derive(Error, Debug)]
pub enum FeedbeatError {
    /// Network or HTTP failure while fetching a feed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The payload could not be parsed as a feed of the expected format.
    #[error("malformed feed: {0}")]
    MalformedFeed(String),

    /// The payload validated as neither RSS 2.0 nor Atom.
    #[error("unrecognized feed format: {0}")]
    UnrecognizedFeedFormat(String),

    /// The stored subscription table could not be deserialized.
    ///
    /// This is escalated rather than silently reset to an empty table,
    /// which would lose every subscription.
    #[error("subscription table is corrupt: {0}")]
    StorageCorrupt(String),

    /// The notification sink rejected a post.
    #[error("post rejected: {0}")]
    Post(String),

    /// Database error.
    ///
    /// Wraps errors from the SQLite key/value substrate.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for FeedbeatError {
    fn from(e: sqlx::Error) -> Self {
        FeedbeatError::Database(e.to_string())
    }
}

/// Result type alias for feedbeat operations.
pub type Result<T> = std::result::Result<T, FeedbeatError>;
