//! Mail store access.
//!
//! [`MailStore`] is what the dispatcher needs from a mail account: list a
//! label, forward a message, move it to the trash. [`JsonMailbox`] backs it
//! with a JSON export on disk:
//!
//! ```json
//! {
//!   "messages": [
//!     {
//!       "id": "m1",
//!       "subject": "Booking confirmed: Yoga Flow at Studio One",
//!       "body": "Date: Tuesday, March 5, 2024\n...",
//!       "date": "2024-03-01T09:12:00Z",
//!       "labels": ["bookings/wellpass"],
//!       "attachments": [
//!         {"name": "ticket.pdf", "content_type": "application/pdf", "content": "..."}
//!       ]
//!     }
//!   ],
//!   "outbox": []
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// Content type of forwarded ticket attachments.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A mail message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Returns true if the message carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Returns the PDF attachments, in message order.
    pub fn pdf_attachments(&self) -> Vec<Attachment> {
        self.attachments
            .iter()
            .filter(|a| a.is_pdf())
            .cloned()
            .collect()
    }
}

/// A file attached to a message. The content is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub content: String,
}

impl Attachment {
    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE)
    }
}

/// A message sent on by [`MailStore::forward`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardedMessage {
    /// Id of the message that was forwarded.
    pub original_id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Operations the dispatcher performs on a mail account.
pub trait MailStore {
    /// Returns the messages carrying `label`, trashed ones included, in
    /// store order.
    fn messages(&self, label: &str) -> ClientResult<Vec<Message>>;

    /// Sends `message`'s body to `to` with a new subject and the given
    /// attachments.
    fn forward(
        &mut self,
        message: &Message,
        subject: &str,
        to: &str,
        attachments: &[Attachment],
    ) -> ClientResult<()>;

    /// Moves `message` to the trash.
    fn trash(&mut self, message: &Message) -> ClientResult<()>;
}

/// On-disk layout of a [`JsonMailbox`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailboxFile {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub outbox: Vec<ForwardedMessage>,
}

/// A mail store kept in a JSON file, rewritten after every change.
#[derive(Debug)]
pub struct JsonMailbox {
    path: PathBuf,
    file: MailboxFile,
}

impl JsonMailbox {
    /// Opens an existing mailbox file.
    pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ClientError::Mailbox(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file = serde_json::from_str(&content).map_err(|e| {
            ClientError::Mailbox(format!("failed to parse {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "opened mailbox");
        Ok(Self { path, file })
    }

    /// Creates a mailbox at `path` holding `file`, writing it immediately.
    pub fn create(path: impl Into<PathBuf>, file: MailboxFile) -> ClientResult<Self> {
        let mailbox = Self {
            path: path.into(),
            file,
        };
        mailbox.save()?;
        Ok(mailbox)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Messages forwarded so far.
    pub fn outbox(&self) -> &[ForwardedMessage] {
        &self.file.outbox
    }

    fn save(&self) -> ClientResult<()> {
        let content = serde_json::to_string_pretty(&self.file).map_err(|e| {
            ClientError::Mailbox(format!("failed to serialize mailbox: {}", e))
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn find_mut(&mut self, id: &str) -> ClientResult<&mut Message> {
        self.file
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ClientError::Mailbox(format!("no message with id {}", id)))
    }
}

impl MailStore for JsonMailbox {
    fn messages(&self, label: &str) -> ClientResult<Vec<Message>> {
        Ok(self
            .file
            .messages
            .iter()
            .filter(|m| m.has_label(label))
            .cloned()
            .collect())
    }

    fn forward(
        &mut self,
        message: &Message,
        subject: &str,
        to: &str,
        attachments: &[Attachment],
    ) -> ClientResult<()> {
        self.file.outbox.push(ForwardedMessage {
            original_id: message.id.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: message.body.clone(),
            attachments: attachments.to_vec(),
        });
        self.save()?;
        info!(
            subject = %message.subject,
            date = %message.date,
            to = %to,
            attachments = attachments.len(),
            "forwarded mail"
        );
        Ok(())
    }

    fn trash(&mut self, message: &Message) -> ClientResult<()> {
        self.find_mut(&message.id)?.in_trash = true;
        self.save()?;
        info!(subject = %message.subject, date = %message.date, "moved mail to trash");
        Ok(())
    }
}
