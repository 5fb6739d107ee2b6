//! Turns event records into calendar actions.
//!
//! Creation never checks for an existing event. Deletion looks at the
//! window `[start, start + max_duration)` and removes the first event whose
//! title and start both match exactly; near misses are left alone.

use chrono::{Local, TimeZone};
use mailcal_core::{EventRecord, TimeWindow};
use tracing::{debug, info};

use crate::calendar::{Calendar, CalendarEvent, NewEvent};
use crate::error::ReconcileError;

/// Applies records to a calendar, reading naive times in `tz`.
#[derive(Debug)]
pub struct Reconciler<C, Tz: TimeZone = Local> {
    calendar: C,
    tz: Tz,
}

impl<C: Calendar> Reconciler<C, Local> {
    /// Creates a reconciler that reads naive times in the local zone.
    pub fn new(calendar: C) -> Self {
        Self {
            calendar,
            tz: Local,
        }
    }
}

impl<C: Calendar, Tz: TimeZone> Reconciler<C, Tz> {
    /// Creates a reconciler that reads naive times in `tz`.
    pub fn with_timezone(calendar: C, tz: Tz) -> Self {
        Self { calendar, tz }
    }

    /// The calendar being written to.
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// The zone naive times are read in.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Creates a calendar event for a booking.
    ///
    /// The end is the record's end time, or its start plus duration.
    ///
    /// # Errors
    ///
    /// Returns a record error for unparsable times and a calendar error
    /// when the backend refuses the event.
    pub async fn create_event(&self, record: &EventRecord) -> Result<CalendarEvent, ReconcileError> {
        let start = record.start_at(&self.tz)?;
        let end = record.end_at(&self.tz)?;

        let mut event = NewEvent::new(record.calendar_title(), start, end);
        if let Some(ref location) = record.location {
            event = event.with_location(location);
        }

        let created = self.calendar.create_event(event).await?;
        info!(
            calendar = self.calendar.name(),
            id = %created.id,
            title = %created.title,
            start = %created.start,
            end = %created.end,
            "created event"
        );
        Ok(created)
    }

    /// Deletes the calendar event matching a cancellation.
    ///
    /// Returns `false` when no event has exactly the record's title and
    /// start inside the search window. At most one event is deleted.
    ///
    /// # Errors
    ///
    /// Returns a record error for an unparsable start and a calendar error
    /// when listing or deleting fails.
    pub async fn delete_event(
        &self,
        record: &EventRecord,
        max_duration: u32,
    ) -> Result<bool, ReconcileError> {
        let title = record.calendar_title();
        let start = record.start_at(&self.tz)?;
        let window = TimeWindow::from_minutes(start, max_duration);

        let candidates = self.calendar.events_in(window).await?;
        debug!(
            title = %title,
            start = %start,
            candidates = candidates.len(),
            "looking for event to delete"
        );

        let Some(event) = candidates
            .into_iter()
            .find(|e| e.title == title && e.start == start)
        else {
            info!(title = %title, start = %start, "no matching event to delete");
            return Ok(false);
        };

        self.calendar.delete_event(&event.id).await?;
        info!(
            calendar = self.calendar.name(),
            id = %event.id,
            title = %event.title,
            "deleted event"
        );
        Ok(true)
    }
}
