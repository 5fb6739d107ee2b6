//! The default command: process the configured label once.

use mailcal_calendar::Reconciler;
use mailcal_providers::Provider;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::error::{ClientError, ClientResult};
use crate::mailbox::JsonMailbox;

/// Options of a run that do not live in `config.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub fail_fast: bool,
    pub json: bool,
}

/// Processes the configured label and prints the report.
///
/// Configuration problems surface before any message is read. With the
/// memory calendar the run is dry: mail is neither forwarded nor trashed.
pub async fn run(config: &ClientConfig, options: RunOptions) -> ClientResult<DispatchReport> {
    let core = config.to_core_config()?;
    let label = config.label()?;
    let provider = Provider::from_config(&core)?;
    let calendar = config.calendar.build()?;
    let mailbox = JsonMailbox::open(config.mailbox_path()?)?;
    info!(
        method = %core.method(),
        calendar = calendar.name(),
        mailbox = %mailbox.path().display(),
        "starting run"
    );

    let dry_run = !config.calendar.backend.is_persistent();
    if dry_run {
        warn!("memory calendar selected, leaving mail untouched");
    }

    let mut dispatcher = Dispatcher::new(provider, core, Reconciler::new(calendar), mailbox)
        .with_fail_fast(options.fail_fast)
        .with_dry_run(dry_run);
    let report = dispatcher.run(label).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ClientError::Config(format!("failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        for message in &report.messages {
            println!("{}: {}", message.subject, message.outcome);
        }
        println!("{}", report);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::mailbox::{MailStore, MailboxFile, Message};

    fn message(id: &str, subject: &str, body: &str) -> Message {
        Message {
            id: id.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            date: chrono::Utc::now(),
            labels: vec!["nightride".to_string()],
            in_trash: false,
            attachments: Vec::new(),
        }
    }

    fn config(mailbox: PathBuf, method: &str) -> ClientConfig {
        ClientConfig {
            label: Some("nightride".to_string()),
            mailbox: Some(mailbox),
            method: Some(method.to_string()),
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn memory_calendar_run_leaves_mail_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail.json");
        JsonMailbox::create(
            &path,
            MailboxFile {
                messages: vec![
                    message(
                        "b1",
                        "Your Nightride booking",
                        "You booked NR45 Endurance on 5. March 2024 18:00 with Anna\naddress is Torstraße 1 / 10119 Berlin",
                    ),
                    message(
                        "c1",
                        "Cancellation",
                        "cancellation for the NR45 Endurance session with Anna at NIGHTRIDE on 5. March 2024 18:00",
                    ),
                ],
                outbox: Vec::new(),
            },
        )
        .unwrap();

        let report = run(&config(path.clone(), "Nightride"), RunOptions::default())
            .await
            .unwrap();
        assert_eq!(report.created(), 1);
        assert_eq!(report.deleted(), 1);

        let mailbox = JsonMailbox::open(&path).unwrap();
        let messages = mailbox.messages("nightride").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.in_trash));
        assert!(mailbox.outbox().is_empty());
    }

    #[tokio::test]
    async fn invalid_method_fails_before_reading_mail() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.json");

        let err = run(&config(missing, "Unknown"), RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(mailcal_core::Error::InvalidConfiguration { .. })
        ));
    }
}
