//! Calendar backends and the event reconciler.
//!
//! - [`Calendar`] - The trait every backend implements
//! - [`MemoryCalendar`] - Ordered in-memory backend for dry runs and tests
//! - [`GoogleCalendar`] - Google Calendar API v3 over a bearer token
//! - [`Reconciler`] - Creates events for bookings, deletes them for cancellations
//!
//! # Example
//!
//! ```ignore
//! use mailcal_calendar::{MemoryCalendar, Reconciler};
//!
//! let reconciler = Reconciler::new(MemoryCalendar::new());
//! reconciler.create_event(&record).await?;
//! let deleted = reconciler.delete_event(&cancellation, config.max_duration()).await?;
//! ```

pub mod calendar;
pub mod error;
pub mod google;
pub mod memory;
pub mod reconcile;

pub use calendar::{BoxFuture, Calendar, CalendarEvent, NewEvent};
pub use error::{CalendarError, CalendarErrorCode, CalendarResult, ReconcileError};
pub use google::GoogleCalendar;
pub use memory::MemoryCalendar;
pub use reconcile::Reconciler;
