//! The calendar abstraction the reconciler writes to.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use mailcal_core::TimeWindow;
use serde::{Deserialize, Serialize};

use crate::error::CalendarResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps [`Calendar`] object-safe so backends can be picked at
/// runtime.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An event as stored in a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Backend identifier, used for deletion.
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
}

/// An event to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
}

impl NewEvent {
    /// Creates an event spanning `[start, end)`.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location: None,
        }
    }

    /// Builder method to attach a location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Turns this request into a stored event with the given id.
    pub fn into_event(self, id: impl Into<String>) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            title: self.title,
            start: self.start,
            end: self.end,
            location: self.location,
        }
    }
}

/// A calendar that can create, list and delete events.
///
/// # Example Implementation
///
/// ```ignore
/// impl Calendar for MyCalendar {
///     fn name(&self) -> &str { "mine" }
///
///     fn create_event(&self, event: NewEvent) -> BoxFuture<'_, CalendarResult<CalendarEvent>> {
///         Box::pin(async move { self.store(event).await })
///     }
///     // ... other methods
/// }
/// ```
pub trait Calendar: Send + Sync {
    /// Returns the backend name (e.g., "memory", "google").
    fn name(&self) -> &str;

    /// Creates an event and returns it with its assigned id.
    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, CalendarResult<CalendarEvent>>;

    /// Returns the events overlapping `window`, in the backend's order.
    fn events_in(&self, window: TimeWindow) -> BoxFuture<'_, CalendarResult<Vec<CalendarEvent>>>;

    /// Deletes the event with the given id.
    fn delete_event<'a>(&'a self, id: &'a str) -> BoxFuture<'a, CalendarResult<()>>;
}

impl<C: Calendar + ?Sized> Calendar for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, CalendarResult<CalendarEvent>> {
        (**self).create_event(event)
    }

    fn events_in(&self, window: TimeWindow) -> BoxFuture<'_, CalendarResult<Vec<CalendarEvent>>> {
        (**self).events_in(window)
    }

    fn delete_event<'a>(&'a self, id: &'a str) -> BoxFuture<'a, CalendarResult<()>> {
        (**self).delete_event(id)
    }
}
