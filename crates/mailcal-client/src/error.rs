//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file missing, unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Mailbox file unreadable, malformed or unknown message.
    #[error("mailbox error: {0}")]
    Mailbox(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing or configuration failure from the core crates.
    #[error(transparent)]
    Core(#[from] mailcal_core::Error),

    /// The record could not be applied to the calendar.
    #[error(transparent)]
    Reconcile(#[from] mailcal_calendar::ReconcileError),

    /// The calendar backend could not be set up.
    #[error(transparent)]
    Calendar(#[from] mailcal_calendar::CalendarError),

    #[error(transparent)]
    Tracing(#[from] mailcal_core::TracingError),

    /// A message failed while running with `--fail-fast`.
    #[error("message {id}: {source}")]
    Message {
        id: String,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Wraps an error with the id of the message being processed.
    pub fn for_message(id: impl Into<String>, source: ClientError) -> Self {
        Self::Message {
            id: id.into(),
            source: Box::new(source),
        }
    }
}
