//! Google Calendar API v3 backend.
//!
//! Authenticates with a ready-made OAuth access token; obtaining and
//! refreshing that token happens outside this crate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use mailcal_core::TimeWindow;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{BoxFuture, Calendar, CalendarEvent, NewEvent};
use crate::error::{CalendarError, CalendarResult};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar client bound to a single calendar.
#[derive(Debug)]
pub struct GoogleCalendar {
    http_client: reqwest::Client,
    access_token: String,
    calendar_id: String,
    base_url: String,
}

impl GoogleCalendar {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a client for `calendar_id` (e.g. `"primary"`).
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty token or when the HTTP
    /// client cannot be built.
    pub fn new(
        access_token: impl Into<String>,
        calendar_id: impl Into<String>,
    ) -> CalendarResult<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CalendarError::configuration("access token is empty").with_backend("google"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                CalendarError::configuration("failed to create HTTP client")
                    .with_backend("google")
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            access_token,
            calendar_id: calendar_id.into(),
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    /// Builder method to point at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    async fn insert(&self, event: NewEvent) -> CalendarResult<CalendarEvent> {
        let body = ApiEvent::from(&event);
        let response = self
            .http_client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let body = read_body(response).await?;
        let created: ApiEvent = serde_json::from_str(&body).map_err(|e| {
            CalendarError::invalid_response(format!("failed to parse response: {}", e))
                .with_backend("google")
        })?;

        let id = created
            .id
            .ok_or_else(|| CalendarError::invalid_response("created event has no id"))?;
        debug!(id = %id, title = %event.title, "inserted event");
        Ok(event.into_event(id))
    }

    async fn list(&self, window: TimeWindow) -> CalendarResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(self.events_url())
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", window.start.to_rfc3339()),
                    ("timeMax", window.end.to_rfc3339()),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(request_error)?;
            let body = read_body(response).await?;
            let page: EventListResponse = serde_json::from_str(&body).map_err(|e| {
                CalendarError::invalid_response(format!("failed to parse response: {}", e))
                    .with_backend("google")
            })?;

            events.extend(page.items.into_iter().filter_map(convert_event));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} events from calendar {}", events.len(), self.calendar_id);
        Ok(events)
    }

    async fn delete(&self, event_id: &str) -> CalendarResult<()> {
        let response = self
            .http_client
            .delete(self.event_url(event_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(request_error)?;
        read_body(response).await?;
        debug!(id = %event_id, "deleted event");
        Ok(())
    }
}

impl Calendar for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, CalendarResult<CalendarEvent>> {
        Box::pin(self.insert(event))
    }

    fn events_in(&self, window: TimeWindow) -> BoxFuture<'_, CalendarResult<Vec<CalendarEvent>>> {
        Box::pin(self.list(window))
    }

    fn delete_event<'a>(&'a self, id: &'a str) -> BoxFuture<'a, CalendarResult<()>> {
        Box::pin(self.delete(id))
    }
}

fn request_error(e: reqwest::Error) -> CalendarError {
    let err = if e.is_timeout() {
        CalendarError::network("request timeout")
    } else if e.is_connect() {
        CalendarError::network(format!("connection failed: {}", e))
    } else {
        CalendarError::network(format!("request failed: {}", e))
    };
    err.with_backend("google").with_source(e)
}

/// Returns the body of a successful response, or the mapped status error.
async fn read_body(response: reqwest::Response) -> CalendarResult<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }
    response.text().await.map_err(|e| {
        CalendarError::network(format!("failed to read response: {}", e)).with_backend("google")
    })
}

fn status_error(status: StatusCode, body: &str) -> CalendarError {
    let err = match status {
        StatusCode::UNAUTHORIZED => CalendarError::authentication("access token expired or invalid"),
        StatusCode::FORBIDDEN => CalendarError::authorization("access denied to calendar"),
        StatusCode::NOT_FOUND | StatusCode::GONE => CalendarError::not_found("event or calendar not found"),
        StatusCode::TOO_MANY_REQUESTS => CalendarError::rate_limited("rate limit exceeded"),
        _ => CalendarError::server(format!("API error ({}): {}", status, body)),
    };
    err.with_backend("google")
}

/// Converts an API event, skipping cancelled and all-day entries.
fn convert_event(event: ApiEvent) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }
    let id = event.id?;
    let start = parse_event_time(&event.start, &id)?;
    let end = parse_event_time(&event.end, &id)?;

    Some(CalendarEvent {
        id,
        title: event.summary.unwrap_or_default(),
        start,
        end,
        location: event.location,
    })
}

fn parse_event_time(time: &ApiEventTime, id: &str) -> Option<DateTime<Utc>> {
    let Some(ref dt) = time.date_time else {
        debug!("event {} has no date-time, skipping", id);
        return None;
    };
    DateTime::parse_from_rfc3339(dt)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| warn!("failed to parse time of event {}: {}", id, e))
        .ok()
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// An event resource, used for both insert and list.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default)]
    start: ApiEventTime,
    #[serde(default)]
    end: ApiEventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
}

impl From<&NewEvent> for ApiEvent {
    fn from(event: &NewEvent) -> Self {
        Self {
            summary: Some(event.title.clone()),
            location: event.location.clone(),
            start: ApiEventTime::at(event.start),
            end: ApiEventTime::at(event.end),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
}

impl ApiEventTime {
    fn at(dt: DateTime<Utc>) -> Self {
        Self {
            date: None,
            date_time: Some(dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let err = GoogleCalendar::new(" ", "primary").unwrap_err();
        assert_eq!(err.code(), crate::error::CalendarErrorCode::ConfigurationError);
    }

    #[test]
    fn urls_encode_ids() {
        let calendar = GoogleCalendar::new("token", "team@group.calendar.google.com")
            .unwrap()
            .with_base_url("http://localhost:9000/v3/");
        assert_eq!(
            calendar.events_url(),
            "http://localhost:9000/v3/calendars/team%40group.calendar.google.com/events"
        );
        assert_eq!(
            calendar.event_url("abc 1"),
            "http://localhost:9000/v3/calendars/team%40group.calendar.google.com/events/abc%201"
        );
    }

    #[test]
    fn insert_body_shape() {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap();
        let event = NewEvent::new("Yoga Flow at Studio One", start, start + chrono::Duration::hours(1))
            .with_location("Main Street 1");
        let body = serde_json::to_value(ApiEvent::from(&event)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "summary": "Yoga Flow at Studio One",
                "location": "Main Street 1",
                "start": {"dateTime": "2024-03-05T17:00:00+00:00"},
                "end": {"dateTime": "2024-03-05T18:00:00+00:00"}
            })
        );
    }

    #[test]
    fn list_response_skips_cancelled_and_all_day() {
        let json = r#"{
            "items": [
                {
                    "id": "e1",
                    "summary": "Spin at Gym East",
                    "start": {"dateTime": "2024-03-05T18:00:00+01:00"},
                    "end": {"dateTime": "2024-03-05T19:00:00+01:00"},
                    "status": "confirmed"
                },
                {
                    "id": "e2",
                    "summary": "Gone",
                    "start": {"dateTime": "2024-03-05T18:00:00Z"},
                    "end": {"dateTime": "2024-03-05T19:00:00Z"},
                    "status": "cancelled"
                },
                {
                    "id": "e3",
                    "summary": "Holiday",
                    "start": {"date": "2024-03-05"},
                    "end": {"date": "2024-03-06"}
                }
            ]
        }"#;
        let page: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<CalendarEvent> = page.items.into_iter().filter_map(convert_event).collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e1");
        assert_eq!(
            events[0].start,
            Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap()
        );
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn status_mapping() {
        use crate::error::CalendarErrorCode;
        let cases = [
            (StatusCode::UNAUTHORIZED, CalendarErrorCode::AuthenticationFailed),
            (StatusCode::FORBIDDEN, CalendarErrorCode::AuthorizationFailed),
            (StatusCode::GONE, CalendarErrorCode::NotFound),
            (StatusCode::TOO_MANY_REQUESTS, CalendarErrorCode::RateLimited),
            (StatusCode::BAD_GATEWAY, CalendarErrorCode::ServerError),
        ];
        for (status, code) in cases {
            assert_eq!(status_error(status, "").code(), code, "{status}");
        }
    }
}
