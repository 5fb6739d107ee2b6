//! Structured-output language model abstraction.
//!
//! The Tickets provider does not parse mail itself. It sends the body to a
//! model together with a JSON schema and reads back JSON that fits it.
//! [`StructuredModel`] is the seam between that provider and the HTTP
//! client, so the provider can be exercised without a network.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use mailcal_core::Result;
use serde::Serialize;

/// A boxed future for the object-safe model trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Instruction followed by the message text.
    pub prompt: String,
    /// Sampling parameters and output constraints, passed through verbatim.
    pub generation_config: GenerationConfig,
}

/// Generation parameters in the wire shape the model expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_schema: ResponseSchema,
}

/// An object schema whose properties are all strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

impl ResponseSchema {
    /// Builds an object schema requiring each of `fields` as a string.
    pub fn required_strings(fields: &[&str]) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: fields
                .iter()
                .map(|f| (f.to_string(), PropertySchema::string()))
                .collect(),
            required: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Schema of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: String,
}

impl PropertySchema {
    /// A string property.
    pub fn string() -> Self {
        Self {
            property_type: "string".to_string(),
        }
    }
}

/// A language model that answers with schema-constrained JSON text.
pub trait StructuredModel: Send + Sync {
    /// Returns the model identifier, for logs.
    fn name(&self) -> &str;

    /// Runs the request and returns the raw text of the first candidate.
    ///
    /// The text is expected to be JSON; callers validate it.
    ///
    /// # Errors
    ///
    /// Returns a model error when the endpoint is unreachable, refuses the
    /// request or sends an undecodable body, and a parse error on
    /// `model output` when the reply carries no candidate text.
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> BoxFuture<'a, Result<String>>;
}
