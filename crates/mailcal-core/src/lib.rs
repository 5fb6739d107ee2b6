//! Core types: event records, durations, date-time text, configuration

pub mod config;
pub mod duration;
pub mod error;
pub mod record;
pub mod time;
pub mod tracing;

pub use config::{Config, ConfigBuilder, Method};
pub use duration::normalize_duration;
pub use error::{Error, Result};
pub use record::EventRecord;
pub use time::{TimeWindow, parse_datetime};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
