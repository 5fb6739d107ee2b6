//! The provider sum type.
//!
//! Each variant knows how to turn a booking or cancellation mail into an
//! [`EventRecord`]. The variant is picked once from the validated
//! [`Config`]; nothing here looks at the method name again.

use mailcal_core::{Config, EventRecord, Method, Result};
use tracing::debug;

use crate::tickets::TicketsParser;
use crate::{nightride, wellpass};

/// A mail source with its own grammar.
#[derive(Debug)]
pub enum Provider {
    /// Indoor cycling studio, body-only grammar.
    Nightride,
    /// Gym pass, subject plus labelled body lines.
    Wellpass,
    /// Ticket shops, language-model extraction.
    Tickets(TicketsParser),
}

impl Provider {
    /// Selects the provider for the configured method.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` when Tickets is selected without an API
    /// key. No request is made.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(match config.method() {
            Method::Nightride => Self::Nightride,
            Method::Wellpass => Self::Wellpass,
            Method::Tickets => Self::Tickets(TicketsParser::from_api_key(config.api_key())?),
        })
    }

    /// The method this provider implements.
    pub fn method(&self) -> Method {
        match self {
            Self::Nightride => Method::Nightride,
            Self::Wellpass => Method::Wellpass,
            Self::Tickets(_) => Method::Tickets,
        }
    }

    /// Parses a booking confirmation.
    ///
    /// A record with neither duration nor end time gets the configured
    /// default duration.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the grammar does not match or a required
    /// field is empty, and a model error when extraction fails.
    pub async fn parse_booking(
        &self,
        text: &str,
        subject: &str,
        config: &Config,
    ) -> Result<EventRecord> {
        let record = match self {
            Self::Nightride => nightride::parse_booking(text)?,
            Self::Wellpass => wellpass::parse_booking(text, subject)?,
            Self::Tickets(parser) => parser.extract(text).await?,
        };
        let record = record
            .ensure_complete()?
            .or_default_duration(config.default_duration());

        debug!(
            method = %self.method(),
            title = %record.title,
            start = %record.start_time,
            duration = ?record.duration,
            "parsed booking"
        );
        Ok(record)
    }

    /// Parses a cancellation notice.
    ///
    /// # Errors
    ///
    /// Same as [`Provider::parse_booking`].
    pub async fn parse_cancellation(&self, text: &str, subject: &str) -> Result<EventRecord> {
        let record = match self {
            Self::Nightride => nightride::parse_cancellation(text)?,
            Self::Wellpass => wellpass::parse_cancellation(text, subject)?,
            Self::Tickets(parser) => parser.extract(text).await?,
        }
        .ensure_complete()?;

        debug!(
            method = %self.method(),
            title = %record.title,
            start = %record.start_time,
            "parsed cancellation"
        );
        Ok(record)
    }
}
