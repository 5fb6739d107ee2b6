//! The canonical event record.
//!
//! An [`EventRecord`] is what every provider parser produces and what the
//! reconciler consumes. It is built fresh for each message and dropped once
//! the calendar has been updated.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::parse_datetime;

fn rename_field(err: Error, field: &str) -> Error {
    match err {
        Error::Parse { message, .. } => Error::parse(field, message),
        other => other,
    }
}

/// A booking or cancellation extracted from a single message.
///
/// Times are kept as the provider wrote them; they are only resolved to
/// instants when the reconciler talks to a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Provider-specific name of the session or show.
    pub title: String,
    /// Where it takes place (studio, theatre, ...).
    pub venue: String,
    /// Start date-time text.
    pub start_time: String,
    /// Length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// End date-time text; wins over `duration` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Free-text address attached to created events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Instructor, when the provider names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,
}

impl EventRecord {
    /// Creates a record with the three required fields.
    pub fn new(
        title: impl Into<String>,
        venue: impl Into<String>,
        start_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            venue: venue.into(),
            start_time: start_time.into(),
            duration: None,
            end_time: None,
            location: None,
            coach: None,
        }
    }

    /// Builder method to set the duration in minutes.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    /// Builder method to set an explicit end time.
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the coach.
    pub fn with_coach(mut self, coach: impl Into<String>) -> Self {
        self.coach = Some(coach.into());
        self
    }

    /// The title used for calendar entries: `"<title> at <venue>"`.
    pub fn calendar_title(&self) -> String {
        format!("{} at {}", self.title, self.venue)
    }

    /// Returns true if neither a duration nor an end time is known.
    pub fn needs_duration(&self) -> bool {
        self.duration.is_none() && self.end_time.is_none()
    }

    /// Fills in `minutes` when the record has no duration and no end time.
    pub fn or_default_duration(mut self, minutes: u32) -> Self {
        if self.needs_duration() {
            self.duration = Some(minutes);
        }
        self
    }

    /// Resolves the start time to an instant, reading naive text in `tz`.
    ///
    /// # Errors
    ///
    /// Returns a `startTime` parse error for unrecognized text.
    pub fn start_at<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>> {
        parse_datetime(&self.start_time, tz).map_err(|e| rename_field(e, "startTime"))
    }

    /// Resolves the end of the event.
    ///
    /// An explicit end time wins; otherwise the end is the start plus the
    /// duration, or the start itself when no duration is known.
    ///
    /// # Errors
    ///
    /// Returns a `startTime` or `endTime` parse error for unrecognized text.
    pub fn end_at<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>> {
        match self.end_time {
            Some(ref end) => parse_datetime(end, tz).map_err(|e| rename_field(e, "endTime")),
            None => {
                let minutes = i64::from(self.duration.unwrap_or(0));
                Ok(self.start_at(tz)? + Duration::minutes(minutes))
            }
        }
    }

    /// Checks that the required fields are non-empty.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the first empty field.
    pub fn ensure_complete(self) -> Result<Self> {
        for (field, value) in [
            ("title", &self.title),
            ("venue", &self.venue),
            ("startTime", &self.start_time),
        ] {
            if value.trim().is_empty() {
                return Err(Error::parse(field, "empty value"));
            }
        }
        Ok(self)
    }
}
