//! Error handling for the stringzip library
//!
//! Construction-time problems (empty symbol sets, impossible code-length
//! budgets, malformed codec files) are reported as [`StringZipError`] values.
//! Bit-level under-reads are programming errors and panic instead; see
//! [`crate::bits::BitReader`].

use thiserror::Error;

/// Main error type for the stringzip library
#[derive(Error, Debug)]
pub enum StringZipError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format or corruption
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },

    /// Codec construction or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl StringZipError {
    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidData { .. } => "data",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StringZipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StringZipError::invalid_data("test message");
        assert_eq!(err.category(), "data");
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_error_categories() {
        let io_err = StringZipError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert_eq!(io_err.category(), "io");

        let config_err = StringZipError::configuration("too few symbols");
        assert_eq!(config_err.category(), "config");
        assert_eq!(
            config_err.to_string(),
            "Invalid configuration: too few symbols"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"))?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().category(), "io");
    }
}
