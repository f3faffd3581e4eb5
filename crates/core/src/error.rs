//! Store error types.

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Binary store errors.
///
/// "Not found" is deliberately absent: missing objects are reported through
/// `Ok(None)` / `Ok(false)` by every backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object name does not match the name grammar.
    #[error("invalid object name: '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Content type does not match the content-type grammar.
    #[error("invalid content type: '{content_type}'")]
    InvalidContentType {
        /// The rejected content type.
        content_type: String,
    },

    /// Required input missing or unreadable.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Backend misconfigured.
    #[error("store configuration error: {0}")]
    Configuration(String),

    /// Registry could not be built.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote storage service failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create an invalid name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create an invalid content type error.
    #[must_use]
    pub fn invalid_content_type(content_type: impl Into<String>) -> Self {
        Self::InvalidContentType {
            content_type: content_type.into(),
        }
    }

    /// Create an argument error.
    #[must_use]
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// True for bad names and bad content types.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. } | Self::InvalidContentType { .. }
        )
    }

    /// Stable error code for logs and exit reporting.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } | Self::InvalidContentType { .. } => "VALIDATION_ERROR",
            Self::Argument(_) => "ARGUMENT_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Unavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Io(_) | Self::Backend(_) => "BACKEND_ERROR",
        }
    }
}

impl From<opendal::Error> for StoreError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(StoreError::invalid_name("bad name!").is_validation());
        assert!(StoreError::invalid_content_type("Text/Plain").is_validation());
        assert!(!StoreError::argument("stream").is_validation());
        assert!(!StoreError::backend("timeout").is_validation());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::invalid_name("x y").error_code(), "VALIDATION_ERROR");
        assert_eq!(StoreError::argument("x").error_code(), "ARGUMENT_ERROR");
        assert_eq!(
            StoreError::configuration("x").error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(
            StoreError::unavailable("x").error_code(),
            "BACKEND_UNAVAILABLE"
        );
        assert_eq!(StoreError::backend("x").error_code(), "BACKEND_ERROR");
        assert_eq!(
            StoreError::from(std::io::Error::other("disk")).error_code(),
            "BACKEND_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::invalid_name("bad name!").to_string(),
            "invalid object name: 'bad name!'"
        );
        assert_eq!(
            StoreError::configuration("Buffer size must be positive integer.").to_string(),
            "store configuration error: Buffer size must be positive integer."
        );
    }

    #[test]
    fn test_opendal_error_mapping() {
        let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "service failed");
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));

        let err = opendal::Error::new(opendal::ErrorKind::ConfigInvalid, "bad endpoint");
        assert!(matches!(StoreError::from(err), StoreError::Configuration(_)));
    }
}
