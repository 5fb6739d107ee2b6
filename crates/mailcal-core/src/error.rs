//! Error kinds shared by the parsers and the reconciler.
//!
//! None of these are recovered internally: a parser or reconciler that
//! raises one hands it straight back to its caller.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or extracting an event record.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration names an unsupported method or carries invalid values.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A provider that needs a credential was selected without one.
    #[error("missing credential: {provider} requires an API key")]
    MissingCredential { provider: String },

    /// A grammar did not match, or model output failed validation.
    #[error("failed to parse {field}: {message}")]
    Parse { field: String, message: String },

    /// The language model endpoint could not be reached or answered badly.
    #[error("model request failed: {message}")]
    Model {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates a missing credential error for the named provider.
    pub fn missing_credential(provider: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
        }
    }

    /// Creates a parse error for the expected field group.
    pub fn parse(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a model error without an underlying cause.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            source: None,
        }
    }

    /// Sets the source error of a model error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_source<E>(self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Self::Model { message, .. } => Self::Model {
                message,
                source: Some(Box::new(source)),
            },
            other => other,
        }
    }

    /// Returns the field group of a parse error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Parse { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns true for parse errors.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
