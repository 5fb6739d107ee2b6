//! Error types for calendar backends and reconciliation.

use std::fmt;

use thiserror::Error;

/// The category of a calendar error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarErrorCode {
    /// Access token missing, expired or rejected.
    AuthenticationFailed,
    /// The token is valid but lacks access to the calendar.
    AuthorizationFailed,
    /// Connection failed, timed out, or DNS resolution failed.
    NetworkError,
    /// Too many requests.
    RateLimited,
    /// The backend answered with an unexpected status.
    ServerError,
    /// The backend answered with a body that could not be decoded.
    InvalidResponse,
    /// The event or calendar does not exist.
    NotFound,
    /// The backend is misconfigured.
    ConfigurationError,
}

impl CalendarErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for CalendarErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by a calendar backend.
#[derive(Debug, Error)]
pub struct CalendarError {
    code: CalendarErrorCode,
    message: String,
    backend: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CalendarError {
    /// Creates a new error with the given code and message.
    pub fn new(code: CalendarErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::AuthenticationFailed, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::AuthorizationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(CalendarErrorCode::ConfigurationError, message)
    }

    /// Sets the backend name for this error.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> CalendarErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref backend) = self.backend {
            write!(f, "[{}] ", backend)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors raised while turning a record into a calendar action.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The record's date-time text could not be resolved.
    #[error(transparent)]
    Record(#[from] mailcal_core::Error),

    /// The calendar backend failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_backend_and_code() {
        let err = CalendarError::rate_limited("too many requests").with_backend("google");
        assert_eq!(
            err.to_string(),
            "[google] rate_limited: too many requests"
        );
        assert_eq!(err.backend(), Some("google"));
    }

    #[test]
    fn source_is_kept() {
        use std::error::Error;
        let io_err = std::io::Error::other("socket closed");
        let err = CalendarError::network("request failed").with_source(io_err);
        assert!(err.source().is_some());
        assert_eq!(err.code(), CalendarErrorCode::NetworkError);
    }

    #[test]
    fn reconcile_error_is_transparent() {
        let err: ReconcileError = mailcal_core::Error::parse("startTime", "bad").into();
        assert_eq!(err.to_string(), "failed to parse startTime: bad");

        let err: ReconcileError = CalendarError::not_found("gone").into();
        assert!(matches!(err, ReconcileError::Calendar(_)));
    }
}
