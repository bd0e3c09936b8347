//! Error types for filehub.

use thiserror::Error;

/// Common error type for filehub.
#[derive(Error, Debug)]
pub enum FilehubError {
    /// Database error.
    ///
    /// Wraps errors from the sqlx driver; they are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file record, owner or stored object does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The requester does not own the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An upload references an owner that does not exist.
    #[error("owner {0} not found")]
    OwnerNotFound(i64),

    /// Login with an unknown email or a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The resource already exists (e.g. a registered email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A name resolved outside the storage root or is otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Every candidate id collided with an existing row.
    #[error("could not allocate a unique id after {0} attempts")]
    IdExhausted(usize),

    /// Zip packaging failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FilehubError {
    fn from(e: sqlx::Error) -> Self {
        FilehubError::Database(e.to_string())
    }
}

impl From<zip::result::ZipError> for FilehubError {
    fn from(e: zip::result::ZipError) -> Self {
        FilehubError::Archive(e.to_string())
    }
}

/// Result type alias for filehub operations.
pub type Result<T> = std::result::Result<T, FilehubError>;
