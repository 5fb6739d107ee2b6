//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/mailcal/config.toml` by default:
//!
//! ```toml
//! label = "bookings/wellpass"
//! mailbox = "~/mail/export.json"
//! method = "Wellpass"
//! default_duration = 60
//! max_duration = 180
//! delete_message = true
//! forward_to = "me@example.com"
//! api_key = "env::GEMINI_API_KEY"
//!
//! [calendar]
//! backend = "google"
//! calendar_id = "primary"
//! access_token = "env::GOOGLE_ACCESS_TOKEN"
//! ```
//!
//! `api_key` and `access_token` accept `env::VAR` references.

use std::path::{Path, PathBuf};

use mailcal_calendar::{Calendar, GoogleCalendar, MemoryCalendar};
use mailcal_core::Config;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Contents of `config.toml`. Every key is optional; the validated
/// [`Config`] is derived with [`ClientConfig::to_core_config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Mail label to process.
    pub label: Option<String>,
    /// Path to the JSON mailbox file.
    pub mailbox: Option<PathBuf>,
    /// Provider name: Nightride, Wellpass or Tickets.
    pub method: Option<String>,
    pub default_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub delete_message: Option<bool>,
    pub forward_to: Option<String>,
    /// Gemini API key (supports `env::`).
    pub api_key: Option<String>,
    pub calendar: CalendarSettings,
}

/// Which calendar backend to write to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarBackend {
    /// Events are kept in memory and logged; nothing leaves the process.
    /// Runs against it are dry runs: mail is neither forwarded nor trashed.
    #[default]
    Memory,
    Google,
}

impl CalendarBackend {
    /// Returns true if events outlive the process.
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::Google)
    }
}

/// The `[calendar]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub backend: CalendarBackend,
    pub calendar_id: String,
    /// OAuth access token for Google (supports `env::`).
    pub access_token: Option<String>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            backend: CalendarBackend::Memory,
            calendar_id: "primary".to_string(),
            access_token: None,
        }
    }
}

impl CalendarSettings {
    /// Builds the configured calendar backend.
    pub fn build(&self) -> ClientResult<Box<dyn Calendar>> {
        match self.backend {
            CalendarBackend::Memory => Ok(Box::new(MemoryCalendar::new())),
            CalendarBackend::Google => {
                let token = secret::resolve_opt(self.access_token.as_deref())?.ok_or_else(|| {
                    ClientError::Config(
                        "access_token is required in [calendar] for the google backend".to_string(),
                    )
                })?;
                Ok(Box::new(GoogleCalendar::new(token, &self.calendar_id)?))
            }
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailcal")
    }

    /// Lets command-line flags take precedence over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref label) = cli.label {
            self.label = Some(label.clone());
        }
        if let Some(ref mailbox) = cli.mailbox {
            self.mailbox = Some(mailbox.clone());
        }
        if let Some(ref method) = cli.method {
            self.method = Some(method.clone());
        }
        if let Some(ref key) = cli.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(ref to) = cli.forward_to {
            self.forward_to = Some(to.clone());
        }
        if cli.keep_messages {
            self.delete_message = Some(false);
        }
    }

    /// Validates the file into a processing [`Config`].
    ///
    /// # Errors
    ///
    /// Fails when `method` is missing or unknown, when Tickets has no API
    /// key, or when an `env::` reference is unset.
    pub fn to_core_config(&self) -> ClientResult<Config> {
        let method = self
            .method
            .as_deref()
            .ok_or_else(|| ClientError::Config("`method` is not set".to_string()))?;

        let mut builder = Config::builder_for(method)?;
        if let Some(minutes) = self.default_duration {
            builder = builder.default_duration(minutes);
        }
        if let Some(minutes) = self.max_duration {
            builder = builder.max_duration(minutes);
        }
        if let Some(delete) = self.delete_message {
            builder = builder.delete_message(delete);
        }
        if let Some(ref to) = self.forward_to {
            builder = builder.forward_to(to);
        }
        if let Some(key) = secret::resolve_opt(self.api_key.as_deref())? {
            builder = builder.api_key(key);
        }
        Ok(builder.build()?)
    }

    /// The label to process.
    pub fn label(&self) -> ClientResult<&str> {
        self.label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| ClientError::Config("`label` is not set".to_string()))
    }

    /// The mailbox path, with a leading `~` expanded to the home directory.
    pub fn mailbox_path(&self) -> ClientResult<PathBuf> {
        let path = self
            .mailbox
            .as_deref()
            .ok_or_else(|| ClientError::Config("`mailbox` is not set".to_string()))?;
        Ok(expand_home(path))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use mailcal_core::Method;

    use super::*;

    const FULL: &str = r#"
label = "bookings/wellpass"
mailbox = "/tmp/export.json"
method = "Wellpass"
default_duration = 45
max_duration = 120
delete_message = false
forward_to = "me@example.com"

[calendar]
backend = "google"
calendar_id = "team"
access_token = "t0ken"
"#;

    #[test]
    fn full_file_parses() {
        let config: ClientConfig = toml::from_str(FULL).unwrap();
        assert_eq!(config.label().unwrap(), "bookings/wellpass");
        assert_eq!(config.calendar.backend, CalendarBackend::Google);
        assert!(config.calendar.backend.is_persistent());
        assert_eq!(config.calendar.calendar_id, "team");

        let core = config.to_core_config().unwrap();
        assert_eq!(core.method(), Method::Wellpass);
        assert_eq!(core.default_duration(), 45);
        assert_eq!(core.max_duration(), 120);
        assert!(!core.delete_message());
        assert_eq!(core.forward_to(), Some("me@example.com"));
    }

    #[test]
    fn defaults_apply_for_missing_keys() {
        let config: ClientConfig = toml::from_str("method = \"Nightride\"\n").unwrap();
        assert_eq!(config.calendar, CalendarSettings::default());
        assert!(!config.calendar.backend.is_persistent());

        let core = config.to_core_config().unwrap();
        assert_eq!(core.default_duration(), Config::DEFAULT_DURATION);
        assert_eq!(core.max_duration(), Config::DEFAULT_MAX_DURATION);
        assert!(core.delete_message());
        assert_eq!(core.forward_to(), None);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let config: ClientConfig = toml::from_str("method = \"Unknown\"\n").unwrap();
        let err = config.to_core_config().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(mailcal_core::Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn missing_method_is_a_config_error() {
        let err = ClientConfig::default().to_core_config().unwrap_err();
        assert!(err.to_string().contains("method"));
    }

    #[test]
    fn tickets_key_from_env() {
        unsafe {
            std::env::set_var("_MAILCAL_TEST_GEMINI_KEY", "AIza-test");
        }
        let config: ClientConfig =
            toml::from_str("method = \"Tickets\"\napi_key = \"env::_MAILCAL_TEST_GEMINI_KEY\"\n")
                .unwrap();
        let core = config.to_core_config().unwrap();
        assert_eq!(core.api_key(), Some("AIza-test"));
        unsafe {
            std::env::remove_var("_MAILCAL_TEST_GEMINI_KEY");
        }
    }

    #[test]
    fn tickets_without_key_is_missing_credential() {
        let config: ClientConfig = toml::from_str("method = \"Tickets\"\n").unwrap();
        let err = config.to_core_config().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(mailcal_core::Error::MissingCredential { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.mailbox_path().unwrap(), PathBuf::from("/tmp/export.json"));
    }

    #[test]
    fn load_from_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "method = [").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn google_backend_needs_a_token() {
        let settings = CalendarSettings {
            backend: CalendarBackend::Google,
            ..CalendarSettings::default()
        };
        assert!(settings.build().is_err());

        let memory = CalendarSettings::default().build().unwrap();
        assert_eq!(memory.name(), "memory");
    }

    #[test]
    fn tilde_is_expanded() {
        let config = ClientConfig {
            mailbox: Some(PathBuf::from("~/mail/export.json")),
            ..ClientConfig::default()
        };
        let path = config.mailbox_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("mail/export.json"));
        }
    }
}
