//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Database error.
    ///
    /// Wraps any store failure that is not a uniqueness conflict.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// A row with the same unique key already exists.
    ///
    /// Produced by the store when the database reports a unique-constraint
    /// violation, so callers can branch on it instead of inspecting messages.
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A user-scoped command was run without a logged-in user.
    #[error("no user logged in")]
    NotLoggedIn,

    /// Validation error for user input or feed data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Feed fetch or parse failure.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Command invoked with missing arguments.
    #[error("usage: {0}")]
    Usage(String),

    /// No handler is registered under the given name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Application configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persisted settings could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// A background task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),
}

// Unique violations become `Duplicate`; everything else is a plain database error.
impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                GatorError::Duplicate(db_err.message().to_string())
            }
            _ => GatorError::Database(e.to_string()),
        }
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_logged_in_display() {
        let err = GatorError::NotLoggedIn;
        assert_eq!(err.to_string(), "no user logged in");
    }

    #[test]
    fn test_validation_error_display() {
        let err = GatorError::Validation("invalid limit".to_string());
        assert_eq!(err.to_string(), "validation error: invalid limit");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = GatorError::NotFound("feed".to_string());
        assert_eq!(err.to_string(), "feed not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatorError = io_err.into();
        assert!(matches!(err, GatorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_row_not_found_is_database_error() {
        let err: GatorError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, GatorError::Database(_)));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = GatorError::Fetch("HTTP error: 500".to_string());
        assert_eq!(err.to_string(), "fetch error: HTTP error: 500");
    }
}
