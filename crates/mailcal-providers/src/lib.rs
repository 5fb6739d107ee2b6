//! Provider parsers that turn booking mail into event records.
//!
//! - [`Provider`] - The sum type over the supported mail sources
//! - [`nightride`] / [`wellpass`] - Regex grammars over subject and body
//! - [`TicketsParser`] - Extraction through a [`StructuredModel`]
//! - [`GeminiClient`] - The Gemini implementation of [`StructuredModel`]
//!
//! # Flow
//!
//! ```text
//!  subject + body
//!        │
//!        ▼
//! ┌─────────────────────────────────────────┐
//! │ Provider::{Nightride, Wellpass, Tickets} │
//! └────────────────────┬────────────────────┘
//!                      │ default duration applied
//!                      ▼
//!               ┌─────────────┐
//!               │ EventRecord │
//!               └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mailcal_providers::Provider;
//!
//! let provider = Provider::from_config(&config)?;
//! let record = provider.parse_booking(body, subject, &config).await?;
//! ```

pub mod gemini;
pub mod model;
pub mod nightride;
pub mod provider;
pub mod tickets;
pub mod wellpass;

pub use gemini::GeminiClient;
pub use model::{BoxFuture, GenerateRequest, GenerationConfig, ResponseSchema, StructuredModel};
pub use provider::Provider;
pub use tickets::TicketsParser;
