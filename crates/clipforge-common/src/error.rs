//! Common error types used throughout clipforge.
//!
//! This module provides a unified error type covering the failure cases the
//! engine distinguishes: invalid input (rejected before a job exists),
//! missing records, database failures, and step execution failures that get
//! surfaced verbatim onto the job record.

/// Common error type for clipforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided. Rejected before any job is created and
    /// never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A pipeline step failed while executing. The message is user-facing
    /// and is stored on the job record as-is.
    #[error("Step failed: {0}")]
    StepFailed(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new StepFailed error.
    pub fn step_failed<S: Into<String>>(msg: S) -> Self {
        Self::StepFailed(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("template job");
        assert_eq!(err.to_string(), "Not found: template job");

        let err = Error::database("connection failed");
        assert_eq!(err.to_string(), "Database error: connection failed");

        let err = Error::invalid_input("empty pipeline");
        assert_eq!(err.to_string(), "Invalid input: empty pipeline");

        let err = Error::step_failed("ffmpeg exited with status 1");
        assert_eq!(err.to_string(), "Step failed: ffmpeg exited with status 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_result_type() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn error_fn() -> Result<i32> {
            Err(Error::invalid_input("bad"))
        }
        assert!(error_fn().is_err());
    }
}
