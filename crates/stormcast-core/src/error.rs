//! Centralized error types for StormCast.
//!
//! Every network collaborator (weather, news) reports failures as a
//! [`FetchError`]. All fetch failures are transient: the caller may retry the
//! same operation with identical arguments.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Settings(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Failure of a network fetch (weather or news).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            FetchError::Timeout => "The request timed out. Please try again.",
            FetchError::Status { status, .. } if *status == 401 || *status == 403 => {
                "The service rejected the API key. Check your settings."
            }
            FetchError::Status { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            FetchError::Status { .. } => "The request failed. Please try again.",
            FetchError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }

    /// Whether an automatic retry with backoff is worthwhile.
    ///
    /// Callers may always retry manually; this only drives [`crate::retry`].
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::ConnectionFailed(_) => true,
            FetchError::Status { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            FetchError::InvalidResponse(_) => false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Persisted key-value settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings storage failed: {0}")]
    Storage(String),

    #[error("Settings file is corrupt: {0}")]
    Corrupt(String),
}

impl SettingsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SettingsError::Storage(_) => "Failed to save your preferences.",
            SettingsError::Corrupt(_) => "Saved preferences were unreadable and have been reset.",
        }
    }
}

/// Extension trait for classifying reqwest errors as fetch failures.
pub trait ReqwestErrorExt {
    fn into_fetch_error(self) -> FetchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_fetch_error(self) -> FetchError {
        if self.is_timeout() {
            FetchError::Timeout
        } else if self.is_connect() {
            FetchError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            FetchError::Status {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            FetchError::InvalidResponse(self.to_string())
        } else {
            FetchError::ConnectionFailed(self.to_string())
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        e.into_fetch_error()
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::InvalidResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::ConnectionFailed("reset".into()).is_transient());
        assert!(FetchError::Status { status: 503, message: String::new() }.is_transient());
        assert!(FetchError::Status { status: 429, message: String::new() }.is_transient());
        assert!(!FetchError::Status { status: 404, message: String::new() }.is_transient());
        assert!(!FetchError::InvalidResponse("eof".into()).is_transient());
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = FetchError::Timeout.into();
        assert!(matches!(app_err, AppError::Fetch(FetchError::Timeout)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Fetch(FetchError::Timeout);
        assert_eq!(
            app_err.user_message(),
            "The request timed out. Please try again."
        );
    }

    #[test]
    fn test_auth_status_message() {
        let err = FetchError::Status { status: 401, message: "unauthorized".into() };
        assert!(err.user_message().contains("API key"));
    }

    #[test]
    fn test_json_error_is_invalid_response() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: FetchError = parse.unwrap_err().into();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }
}
