//! In-memory calendar for dry runs and tests.

use mailcal_core::TimeWindow;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::calendar::{BoxFuture, Calendar, CalendarEvent, NewEvent};
use crate::error::{CalendarError, CalendarResult};

/// A calendar kept in a vector, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<CalendarEvent>>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calendar holding `events`, in that order.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Returns a copy of every stored event.
    pub async fn snapshot(&self) -> Vec<CalendarEvent> {
        self.events.lock().await.clone()
    }
}

impl Calendar for MemoryCalendar {
    fn name(&self) -> &str {
        "memory"
    }

    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, CalendarResult<CalendarEvent>> {
        Box::pin(async move {
            let event = event.into_event(Uuid::new_v4().to_string());
            debug!(id = %event.id, title = %event.title, "storing event");
            self.events.lock().await.push(event.clone());
            Ok(event)
        })
    }

    fn events_in(&self, window: TimeWindow) -> BoxFuture<'_, CalendarResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            let events = self.events.lock().await;
            Ok(events
                .iter()
                .filter(|e| window.overlaps(e.start, e.end))
                .cloned()
                .collect())
        })
    }

    fn delete_event<'a>(&'a self, id: &'a str) -> BoxFuture<'a, CalendarResult<()>> {
        Box::pin(async move {
            let mut events = self.events.lock().await;
            let index = events
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| {
                    CalendarError::not_found(format!("no event with id {id}")).with_backend("memory")
                })?;
            events.remove(index);
            Ok(())
        })
    }
}
