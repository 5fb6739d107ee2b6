//! CLI, mail store, dispatcher
//!
//! This crate provides the `mailcal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod mailbox;
pub mod secret;

pub use cli::Cli;
pub use dispatch::{DispatchReport, Dispatcher, MessageKind, MessageOutcome};
pub use error::{ClientError, ClientResult};
pub use mailbox::{JsonMailbox, MailStore, Message};
