//! Ticket shop mails, extracted by a language model.
//!
//! Ticket confirmations have no stable template, so instead of a grammar
//! the body is handed to a [`StructuredModel`] with a schema requiring
//! `venue`, `title`, `startTime` and `location`.

use std::fmt;

use mailcal_core::{Error, EventRecord, Result};
use serde::Deserialize;
use tracing::debug;

use crate::gemini::GeminiClient;
use crate::model::{GenerateRequest, GenerationConfig, ResponseSchema, StructuredModel};

/// Instruction placed before the message body.
pub const EXTRACTION_PROMPT: &str = "Extract event details with startTime in ISO format.\n";

/// Fields the model must return.
pub const REQUIRED_FIELDS: [&str; 4] = ["venue", "title", "startTime", "location"];

/// Parser backed by a structured-output model.
pub struct TicketsParser {
    model: Box<dyn StructuredModel>,
}

impl fmt::Debug for TicketsParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketsParser")
            .field("model", &self.model.name())
            .finish()
    }
}

impl TicketsParser {
    /// Creates a parser that talks to Gemini with the given key.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` when no key is given; nothing is sent.
    pub fn from_api_key(api_key: Option<&str>) -> Result<Self> {
        let key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::missing_credential("Tickets"))?;
        Ok(Self::with_model(GeminiClient::new(key)?))
    }

    /// Creates a parser on top of any structured model.
    pub fn with_model(model: impl StructuredModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Builds the request sent for a message body.
    pub fn request_for(text: &str) -> GenerateRequest {
        GenerateRequest {
            prompt: format!("{EXTRACTION_PROMPT}{text}"),
            generation_config: GenerationConfig {
                temperature: 1.0,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 100,
                response_mime_type: "application/json".to_string(),
                response_schema: ResponseSchema::required_strings(&REQUIRED_FIELDS),
            },
        }
    }

    /// Extracts an event from a ticket confirmation body.
    ///
    /// # Errors
    ///
    /// Model errors propagate; output that is not JSON or lacks a required
    /// field is a parse error.
    pub async fn extract(&self, text: &str) -> Result<EventRecord> {
        let request = Self::request_for(text);
        let output = self.model.generate(&request).await?;
        debug!(model = self.model.name(), output = %output, "model answered");
        parse_model_output(&output)
    }
}

/// The four fields of the response schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedEvent {
    venue: String,
    title: String,
    start_time: String,
    location: String,
}

fn parse_model_output(output: &str) -> Result<EventRecord> {
    let extracted: ExtractedEvent = serde_json::from_str(output)
        .map_err(|e| Error::parse("model output", e.to_string()))?;

    Ok(EventRecord::new(extracted.title, extracted.venue, extracted.start_time)
        .with_location(extracted.location))
}
