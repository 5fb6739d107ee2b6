//! Gemini `generateContent` client.
//!
//! Only the data contract is handled here: the request envelope with the
//! generation config, and the first candidate's text in the response.

use std::time::Duration;

use mailcal_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::model::{BoxFuture, GenerateRequest, GenerationConfig, StructuredModel};

/// Base URL of the Generative Language API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Model used unless configured otherwise.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-8b";

/// Client for the Gemini REST API, authenticated by API key.
#[derive(Debug)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a client for the default model.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` for an empty key, or a model error if the
    /// HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::missing_credential("Tickets"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::model("failed to create HTTP client").with_source(e))?;
        let base_url = Url::parse(GEMINI_API_BASE)
            .map_err(|e| Error::model("invalid API base URL").with_source(e))?;

        Ok(Self {
            http_client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url,
        })
    }

    /// Builder method to use another model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to point at another endpoint (proxies, tests).
    ///
    /// The URL should end with a slash.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// The `generateContent` URL, with the key as query parameter.
    pub fn endpoint(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| Error::model("invalid model endpoint").with_source(e))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post(&self, request: &GenerateRequest) -> Result<String> {
        let body = GenerateContentRequest::from(request);

        debug!(model = %self.model, "requesting structured extraction");
        let response = self
            .http_client
            .post(self.endpoint()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                Error::model(message).with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::model(format!("API error ({}): {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::model("failed to read response").with_source(e))?;

        first_candidate_text(&body)
    }
}

impl StructuredModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.post(request))
    }
}

/// Extracts `candidates[0].content.parts[0].text` from a response body.
///
/// An undecodable envelope is a model error; a well-formed reply without
/// candidate text is a parse error on the model output.
fn first_candidate_text(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| Error::model("failed to decode response").with_source(e))?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| Error::parse("model output", "response contains no candidate text"))
}

/// Request envelope of `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

impl<'a> From<&'a GenerateRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: &request.generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Response of `generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResponseSchema;

    fn sample_request() -> GenerateRequest {
        GenerateRequest {
            prompt: "Extract.\nbody".to_string(),
            generation_config: GenerationConfig {
                temperature: 1.0,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 100,
                response_mime_type: "application/json".to_string(),
                response_schema: ResponseSchema::required_strings(&["title"]),
            },
        }
    }

    #[test]
    fn empty_key_is_missing_credential() {
        let err = GeminiClient::new("").unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
    }

    #[test]
    fn endpoint_carries_model_and_key() {
        let client = GeminiClient::new("k3y").unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-8b:generateContent?key=k3y"
        );

        let client = client
            .with_model("gemini-2.0-flash")
            .with_base_url(Url::parse("http://localhost:8080/v1/").unwrap());
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://localhost:8080/v1/models/gemini-2.0-flash:generateContent?key=k3y"
        );
        assert_eq!(client.name(), "gemini-2.0-flash");
    }

    #[test]
    fn request_envelope_shape() {
        let request = sample_request();
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"parts": [{"text": "Extract.\nbody"}]}],
                "generationConfig": {
                    "temperature": 1.0,
                    "topP": 0.95,
                    "topK": 40,
                    "maxOutputTokens": 100,
                    "responseMimeType": "application/json",
                    "responseSchema": {
                        "type": "object",
                        "properties": {"title": {"type": "string"}},
                        "required": ["title"]
                    }
                }
            })
        );
    }

    #[test]
    fn reads_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"title\":\"Hamlet\"}"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(first_candidate_text(body).unwrap(), r#"{"title":"Hamlet"}"#);
    }

    #[test]
    fn no_candidate_text_is_a_parse_error() {
        let err = first_candidate_text(r#"{"candidates": []}"#).unwrap_err();
        assert_eq!(err.field(), Some("model output"));

        let err = first_candidate_text(r#"{"candidates": [{"content": {"parts": []}}]}"#).unwrap_err();
        assert_eq!(err.field(), Some("model output"));

        let err = first_candidate_text("not json").unwrap_err();
        assert!(matches!(err, Error::Model { .. }));
    }
}
