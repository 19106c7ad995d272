//! Common error types for LXP

use thiserror::Error;

/// Common result type for LXP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LXP services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data could not be decoded, or other internal fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error is a SQLite UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
