//! Error types for the DhunJam venue admin console

use thiserror::Error;

/// Main error type for the venue admin console
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure talking to the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("{context} failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// What was being attempted
        context: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// No session is available for an operation that needs one
    #[error("Not logged in")]
    NotAuthenticated,

    /// Save was requested while the form is not eligible
    #[error("Save is not permitted with the current pricing")]
    SaveNotPermitted,

    /// Save was requested while another save is pending
    #[error("A save is already in flight")]
    SaveInFlight,

    /// A save completion arrived for a request that is no longer current
    #[error("Save ticket {ticket} is not the pending save")]
    StaleSave {
        /// Ticket carried by the completion
        ticket: u64,
    },

    /// Chart rendering error
    #[error("Chart error: {0}")]
    Chart(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a validation error for a field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error came from talking to the backend
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "session.json");
        let app_error = Error::from(io_error);

        assert!(matches!(app_error, Error::Io(_)));
        assert!(format!("{}", app_error).contains("I/O error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_status_error_display() {
        let error = Error::Status {
            status: 401,
            context: "Login".to_string(),
        };

        assert_eq!(format!("{}", error), "Login failed with status 401");
        assert!(error.is_remote());
    }

    #[test]
    fn test_validation_error_display() {
        let error = Error::validation("category_6", "not a number");
        assert_eq!(
            format!("{}", error),
            "Validation error: category_6 - not a number"
        );
        assert!(!error.is_remote());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{\"data\": }").unwrap_err();
        let app_error = Error::from(json_error);

        assert!(matches!(app_error, Error::Serialization(_)));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_save_gate_errors() {
        assert_eq!(
            Error::SaveNotPermitted.to_string(),
            "Save is not permitted with the current pricing"
        );
        assert_eq!(Error::SaveInFlight.to_string(), "A save is already in flight");
        assert_eq!(
            Error::StaleSave { ticket: 3 }.to_string(),
            "Save ticket 3 is not the pending save"
        );
    }

    #[test]
    fn test_network_error_is_remote() {
        assert!(Error::Network("connection refused".to_string()).is_remote());
        assert!(!Error::NotAuthenticated.is_remote());
        assert!(!Error::Chart("no handle".to_string()).is_remote());
    }
}
