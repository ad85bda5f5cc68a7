//! Common error types used throughout livestream-scheduler.
//!
//! Covers the failure cases shared by the asset sources and the template
//! loader: missing entries, invalid input and I/O failures.

/// Common error type for livestream-scheduler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entry was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("defaults.json");
        assert_eq!(err.to_string(), "Not found: defaults.json");

        let err = Error::invalid_input("queue equals done");
        assert_eq!(err.to_string(), "Invalid input: queue equals done");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
