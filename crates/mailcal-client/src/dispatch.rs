//! Per-label message processing.
//!
//! Every message under the label is classified by its subject, parsed by
//! the configured provider and applied to the calendar. Each message ends
//! in a [`MessageOutcome`]; a failure is recorded and the next message is
//! still processed, unless fail-fast is requested.
//!
//! A dry run still writes to the calendar but never forwards or trashes
//! mail, so the mailbox is left as it was found.

use std::fmt;

use chrono::{Local, TimeZone};
use mailcal_calendar::{Calendar, CalendarEvent, Reconciler};
use mailcal_core::Config;
use mailcal_providers::Provider;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::mailbox::{MailStore, Message};

/// What a message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Booking,
    Cancellation,
}

impl MessageKind {
    /// A subject mentioning `cancel` in any case is a cancellation.
    pub fn classify(subject: &str) -> Self {
        if subject.to_lowercase().contains("cancel") {
            Self::Cancellation
        } else {
            Self::Booking
        }
    }
}

/// How a single message was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Already in the trash; left untouched.
    Skipped,
    /// A booking became a calendar event.
    Created {
        event_id: String,
        title: String,
        forwarded: bool,
    },
    /// A cancellation removed its calendar event.
    Deleted { title: String },
    /// A cancellation matched no calendar event.
    NotFound { title: String },
    /// Parsing or reconciling failed; the message was not trashed.
    Failed { error: String },
}

impl fmt::Display for MessageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped (in trash)"),
            Self::Created {
                title, forwarded, ..
            } => {
                write!(f, "created \"{}\"", title)?;
                if *forwarded {
                    write!(f, ", tickets forwarded")?;
                }
                Ok(())
            }
            Self::Deleted { title } => write!(f, "deleted \"{}\"", title),
            Self::NotFound { title } => write!(f, "no event \"{}\" to delete", title),
            Self::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// Outcome of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReport {
    pub id: String,
    pub subject: String,
    #[serde(flatten)]
    pub outcome: MessageOutcome,
}

/// Outcomes of a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub messages: Vec<MessageReport>,
}

impl DispatchReport {
    fn count(&self, pred: impl Fn(&MessageOutcome) -> bool) -> usize {
        self.messages.iter().filter(|m| pred(&m.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Created { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Deleted { .. }))
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::NotFound { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Failed { .. }))
    }

    /// Returns true if no message failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} deleted, {} not found, {} skipped, {} failed",
            self.created(),
            self.deleted(),
            self.not_found(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Subject of a forwarded booking: `Tickets: <title> on Tue Mar 05 2024`.
pub fn forward_subject<Tz: TimeZone>(event: &CalendarEvent, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "Tickets: {} on {}",
        event.title,
        event.start.with_timezone(tz).format("%a %b %d %Y")
    )
}

/// Runs messages through a provider and a reconciler.
pub struct Dispatcher<S, C, Tz: TimeZone = Local> {
    provider: Provider,
    config: Config,
    reconciler: Reconciler<C, Tz>,
    store: S,
    fail_fast: bool,
    dry_run: bool,
}

impl<S, C, Tz> Dispatcher<S, C, Tz>
where
    S: MailStore,
    C: Calendar,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    pub fn new(provider: Provider, config: Config, reconciler: Reconciler<C, Tz>, store: S) -> Self {
        Self {
            provider,
            config,
            reconciler,
            store,
            fail_fast: false,
            dry_run: false,
        }
    }

    /// Builder method to stop at the first failing message.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Builder method to leave every message in place: no forwarding, no
    /// trashing.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reconciler(&self) -> &Reconciler<C, Tz> {
        &self.reconciler
    }

    /// Processes every message under `label`, in store order.
    ///
    /// # Errors
    ///
    /// Fails when the label cannot be listed, or with the first message
    /// error when fail-fast is set.
    pub async fn run(&mut self, label: &str) -> ClientResult<DispatchReport> {
        let messages = self.store.messages(label)?;
        info!(
            label = %label,
            count = messages.len(),
            dry_run = self.dry_run,
            "processing label"
        );

        let mut report = DispatchReport::default();
        for message in messages {
            let outcome = if message.in_trash {
                debug!(id = %message.id, "skipping trashed message");
                MessageOutcome::Skipped
            } else {
                match self.process(&message).await {
                    Ok(outcome) => outcome,
                    Err(e) if self.fail_fast => return Err(ClientError::for_message(&message.id, e)),
                    Err(e) => {
                        warn!(id = %message.id, subject = %message.subject, error = %e, "message failed");
                        MessageOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };
            report.messages.push(MessageReport {
                id: message.id,
                subject: message.subject,
                outcome,
            });
        }

        info!(label = %label, summary = %report, "label done");
        Ok(report)
    }

    async fn process(&mut self, message: &Message) -> ClientResult<MessageOutcome> {
        let outcome = match MessageKind::classify(&message.subject) {
            MessageKind::Booking => {
                let record = self
                    .provider
                    .parse_booking(&message.body, &message.subject, &self.config)
                    .await?;
                let event = self.reconciler.create_event(&record).await?;

                let forwarded = match self.config.forward_to().map(str::to_string) {
                    Some(to) if !self.dry_run => self.forward(message, &event, &to),
                    _ => false,
                };
                MessageOutcome::Created {
                    event_id: event.id,
                    title: event.title,
                    forwarded,
                }
            }
            MessageKind::Cancellation => {
                let record = self
                    .provider
                    .parse_cancellation(&message.body, &message.subject)
                    .await?;
                let title = record.calendar_title();
                if self
                    .reconciler
                    .delete_event(&record, self.config.max_duration())
                    .await?
                {
                    MessageOutcome::Deleted { title }
                } else {
                    MessageOutcome::NotFound { title }
                }
            }
        };

        if self.config.delete_message() && !self.dry_run {
            self.store.trash(message)?;
        }
        Ok(outcome)
    }

    /// Forwards the PDF attachments of a booking.
    ///
    /// The event already exists at this point, so a failure is logged and
    /// reported as not forwarded rather than failing the message.
    fn forward(&mut self, message: &Message, event: &CalendarEvent, to: &str) -> bool {
        let subject = forward_subject(event, self.reconciler.timezone());
        match self
            .store
            .forward(message, &subject, to, &message.pdf_attachments())
        {
            Ok(()) => true,
            Err(e) => {
                warn!(id = %message.id, to = %to, error = %e, "forwarding tickets failed");
                false
            }
        }
    }
}
