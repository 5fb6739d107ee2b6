//! Processing configuration.
//!
//! A [`Config`] is built once through [`ConfigBuilder`], validated at
//! construction, and only read afterwards.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The supported mail providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Indoor cycling bookings; grammar over the body.
    Nightride,
    /// Gym pass bookings; grammar over subject and body.
    Wellpass,
    /// Ticket shops; extraction through a language model.
    Tickets,
}

impl Method {
    /// All supported methods, in display order.
    pub const ALL: [Method; 3] = [Method::Nightride, Method::Wellpass, Method::Tickets];

    /// Returns the canonical name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nightride => "Nightride",
            Self::Wellpass => "Wellpass",
            Self::Tickets => "Tickets",
        }
    }

    /// Returns true if this method calls out to a language model.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Tickets)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nightride" => Ok(Self::Nightride),
            "wellpass" => Ok(Self::Wellpass),
            "tickets" | "ticket" => Ok(Self::Tickets),
            _ => {
                let supported: Vec<&str> = Self::ALL.iter().map(Method::as_str).collect();
                Err(Error::invalid_configuration(format!(
                    "method should be one of {} but '{}' given",
                    supported.join(", "),
                    s
                )))
            }
        }
    }
}

/// Validated settings for parsing and reconciling messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    method: Method,
    default_duration: u32,
    max_duration: u32,
    api_key: Option<String>,
    delete_message: bool,
    forward_to: Option<String>,
}

impl Config {
    /// Minutes used for bookings that state no duration.
    pub const DEFAULT_DURATION: u32 = 60;

    /// Minutes searched after a cancelled start time.
    pub const DEFAULT_MAX_DURATION: u32 = 180;

    /// Starts a builder for the given method.
    pub fn builder(method: Method) -> ConfigBuilder {
        ConfigBuilder::new(method)
    }

    /// Starts a builder from a method name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an unsupported name.
    pub fn builder_for(method: &str) -> Result<ConfigBuilder> {
        Ok(ConfigBuilder::new(method.parse()?))
    }

    /// The selected provider.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Minutes applied when a booking states neither duration nor end.
    pub fn default_duration(&self) -> u32 {
        self.default_duration
    }

    /// Length of the delete search window in minutes.
    pub fn max_duration(&self) -> u32 {
        self.max_duration
    }

    /// API key for the language model, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Whether processed messages are moved to the trash.
    pub fn delete_message(&self) -> bool {
        self.delete_message
    }

    /// Address that receives ticket attachments, if any.
    pub fn forward_to(&self) -> Option<&str> {
        self.forward_to.as_deref()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    method: Method,
    default_duration: u32,
    max_duration: u32,
    api_key: Option<String>,
    delete_message: bool,
    forward_to: Option<String>,
}

impl ConfigBuilder {
    /// Creates a builder with the default durations.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            default_duration: Config::DEFAULT_DURATION,
            max_duration: Config::DEFAULT_MAX_DURATION,
            api_key: None,
            delete_message: true,
            forward_to: None,
        }
    }

    /// Builder: set the default duration in minutes.
    pub fn default_duration(mut self, minutes: u32) -> Self {
        self.default_duration = minutes;
        self
    }

    /// Builder: set the delete search window in minutes.
    pub fn max_duration(mut self, minutes: u32) -> Self {
        self.max_duration = minutes;
        self
    }

    /// Builder: set the language model API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder: set whether processed messages are trashed.
    pub fn delete_message(mut self, delete: bool) -> Self {
        self.delete_message = delete;
        self
    }

    /// Builder: set the forwarding address for attachments.
    pub fn forward_to(mut self, address: impl Into<String>) -> Self {
        self.forward_to = Some(address.into());
        self
    }

    /// Validates and builds the configuration.
    ///
    /// Empty strings for the key or forwarding address count as absent.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if the method needs an API key and none is set
    /// - `InvalidConfiguration` if the delete window is zero
    pub fn build(self) -> Result<Config> {
        let api_key = self.api_key.filter(|k| !k.trim().is_empty());
        let forward_to = self.forward_to.filter(|a| !a.trim().is_empty());

        if self.method.requires_api_key() && api_key.is_none() {
            return Err(Error::missing_credential(self.method.as_str()));
        }
        if self.max_duration == 0 {
            return Err(Error::invalid_configuration(
                "max_duration must be at least one minute",
            ));
        }

        Ok(Config {
            method: self.method,
            default_duration: self.default_duration,
            max_duration: self.max_duration,
            api_key,
            delete_message: self.delete_message,
            forward_to,
        })
    }
}
