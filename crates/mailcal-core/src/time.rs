//! Date-time text and query windows.
//!
//! Providers write dates however their mail templates do: `March 5, 2024
//! 6:00 PM`, `5. March 2024 18:00`, `2024-3-5 18:00`, RFC 3339 from the
//! model. [`parse_datetime`] accepts all of them. Text without an offset is
//! read in the caller's time zone; nothing is converted beyond that.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Leading weekday such as `Tuesday, ` or `Tue `.
static WEEKDAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("Invalid weekday regex")
});

/// Joining words between the date and the time.
static DATE_TIME_JOINER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(at|um|,)\s+").expect("Invalid joiner regex"));

/// Meridiem glued to the minutes (`6:00PM`).
static MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)\s*([ap]\.?m\.?)$").expect("Invalid meridiem regex"));

/// Naive layouts tried in order after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %H:%M",
    "%d. %B %Y %H:%M",
    "%d. %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Offset-carrying layouts that RFC 3339 rejects (no seconds).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Parses provider date-time text into a UTC instant.
///
/// Text with an explicit offset keeps it; anything else is interpreted as a
/// wall-clock time in `tz`. On an ambiguous wall-clock time (DST fold) the
/// earlier instant is taken.
///
/// # Errors
///
/// Returns a `dateTime` parse error if no known layout matches, or if the
/// wall-clock time does not exist in `tz`.
pub fn parse_datetime<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let cleaned = clean(trimmed);
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&cleaned, format).ok())
        .ok_or_else(|| Error::parse("dateTime", format!("unrecognized date-time '{text}'")))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::parse("dateTime", format!("'{text}' does not exist locally")))
}

fn clean(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_weekday = WEEKDAY_PREFIX.replace(&collapsed, "");
    let joined = DATE_TIME_JOINER.replace_all(&without_weekday, " ");
    MERIDIEM
        .replace(&joined, |caps: &regex::Captures| {
            format!("{} {}", &caps[1], caps[2].replace('.', "").to_uppercase())
        })
        .into_owned()
}

/// A half-open interval `[start, end)` in UTC used to query a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window spanning `minutes` from `start`.
    pub fn from_minutes(start: DateTime<Utc>, minutes: u32) -> Self {
        Self::new(start, start + Duration::minutes(i64::from(minutes)))
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks whether `[start, end)` shares any instant with this window.
    ///
    /// A zero-length event counts when its instant lies inside the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start == end {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }

    /// Checks whether an instant lies in the window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        dt >= self.start && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn rfc3339_keeps_offset() {
            let dt = parse_datetime("2024-03-05T18:00:00+01:00", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 17, 0));
        }

        #[test]
        fn offset_without_seconds() {
            let dt = parse_datetime("2024-03-05T18:00+02:00", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 16, 0));
        }

        #[test]
        fn iso_without_offset_uses_zone() {
            let cet = FixedOffset::east_opt(3600).unwrap();
            let dt = parse_datetime("2024-03-05T18:00:00", &cet).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 17, 0));
        }

        #[test]
        fn wellpass_long_date_with_meridiem() {
            let dt = parse_datetime("March 5, 2024 6:00 PM", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 18, 0));
        }

        #[test]
        fn glued_meridiem() {
            let dt = parse_datetime("March 5, 2024 6:30pm", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 18, 30));
        }

        #[test]
        fn nightride_dotted_day() {
            let dt = parse_datetime("5. March 2024 18:00", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 18, 0));
        }

        #[test]
        fn weekday_and_joiner_are_dropped() {
            let dt = parse_datetime("Tuesday, 5. March 2024 at 18:00", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 18, 0));
        }

        #[test]
        fn assembled_year_month_day() {
            let dt = parse_datetime("2024-3-5 7:15 AM", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 7, 15));
            let dt = parse_datetime("2024-3-5 19:15", &Utc).unwrap();
            assert_eq!(dt, utc(2024, 3, 5, 19, 15));
        }

        #[test]
        fn garbage_is_a_parse_error() {
            let err = parse_datetime("next tuesday-ish", &Utc).unwrap_err();
            assert_eq!(err.field(), Some("dateTime"));
        }
    }

    mod window {
        use super::*;

        #[test]
        fn from_minutes() {
            let window = TimeWindow::from_minutes(utc(2024, 3, 5, 18, 0), 180);
            assert_eq!(window.end, utc(2024, 3, 5, 21, 0));
            assert_eq!(window.duration(), Duration::minutes(180));
        }

        #[test]
        fn overlap_is_half_open() {
            let window = TimeWindow::from_minutes(utc(2024, 3, 5, 18, 0), 60);
            assert!(window.overlaps(utc(2024, 3, 5, 17, 30), utc(2024, 3, 5, 18, 30)));
            assert!(!window.overlaps(utc(2024, 3, 5, 17, 0), utc(2024, 3, 5, 18, 0)));
            assert!(!window.overlaps(utc(2024, 3, 5, 19, 0), utc(2024, 3, 5, 20, 0)));
        }

        #[test]
        fn zero_length_event_inside_window() {
            let window = TimeWindow::from_minutes(utc(2024, 3, 5, 18, 0), 60);
            let at = utc(2024, 3, 5, 18, 0);
            assert!(window.overlaps(at, at));
        }

        #[test]
        #[should_panic(expected = "TimeWindow start must be <= end")]
        fn inverted_window_panics() {
            TimeWindow::new(utc(2024, 3, 5, 18, 0), utc(2024, 3, 5, 17, 0));
        }
    }
}
