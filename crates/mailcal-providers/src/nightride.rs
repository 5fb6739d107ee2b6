//! Nightride (indoor cycling) mails.
//!
//! Everything comes from the body. Bookings read
//!
//! ```text
//! You booked NR45 Endurance on Tuesday, 5. March 2024 18:00 with Anna.
//! ...
//! Our address is Torstraße 1 / 10119 Berlin
//! ```
//!
//! and the session length is the number glued to `NR` in the title.

use std::sync::LazyLock;

use mailcal_core::{Error, EventRecord, Result};
use regex::{Captures, Regex};

/// Every Nightride session takes place at the same venue.
pub const VENUE: &str = "NIGHTRIDE";

static BOOKING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"You\sbooked\s(?P<title>NR.*)\son\s(?P<start>.*)\swith\s(?P<coach>\w+)")
        .expect("Invalid Nightride booking regex")
});

static TITLE_DURATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NR(?P<minutes>\d+)").expect("Invalid Nightride title regex"));

static ADDRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"address\sis\s(?P<street>.*)\s/\s(?P<zip>\d{5})\s(?P<city>\w+)")
        .expect("Invalid Nightride address regex")
});

static CANCELLATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"cancellation\sfor\sthe\s(?P<title>\w+.*)\ssession\swith\s(?P<coach>\w+)\sat\s(?P<venue>\w+.*)\son\s(?P<start>\d+\.\s\w+\s\d{4}\s\d{2}:\d{2})",
    )
    .expect("Invalid Nightride cancellation regex")
});

/// Parses a booking confirmation body.
///
/// # Errors
///
/// Returns a parse error naming `event`, `duration` or `location` when the
/// corresponding sentence is missing.
pub fn parse_booking(text: &str) -> Result<EventRecord> {
    let event = BOOKING_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("event", "no 'You booked NR… on … with …' sentence"))?;
    let title = group(&event, "title");

    let minutes = TITLE_DURATION_REGEX
        .captures(title)
        .and_then(|c| c.name("minutes"))
        .ok_or_else(|| Error::parse("duration", format!("no minutes in title '{title}'")))?
        .as_str()
        .parse::<u32>()
        .map_err(|e| Error::parse("duration", e.to_string()))?;

    let address = ADDRESS_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("location", "no 'address is … / ZIP City' sentence"))?;
    let location = format!(
        "{}, {} {}",
        group(&address, "street"),
        group(&address, "zip"),
        group(&address, "city")
    );

    Ok(EventRecord::new(title, VENUE, group(&event, "start"))
        .with_duration(minutes)
        .with_location(location)
        .with_coach(group(&event, "coach")))
}

/// Parses a cancellation notice body.
///
/// The venue is taken from the text, not the constant.
///
/// # Errors
///
/// Returns an `event` parse error when the cancellation sentence is missing.
pub fn parse_cancellation(text: &str) -> Result<EventRecord> {
    let event = CANCELLATION_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("event", "no 'cancellation for the … session' sentence"))?;

    Ok(
        EventRecord::new(group(&event, "title"), group(&event, "venue"), group(&event, "start"))
            .with_coach(group(&event, "coach")),
    )
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING: &str = "Hi Max,\n\
        You booked NR45 Endurance on Tuesday, 5. March 2024 18:00 with Anna.\n\
        Please arrive 10 minutes early.\n\
        Our address is Torstraße 1 / 10119 Berlin\n";

    const CANCELLATION: &str = "Hi Max,\n\
        we confirm the cancellation for the NR45 Endurance session with Anna at NIGHTRIDE Mitte on 5. March 2024 18:00.\n";

    #[test]
    fn booking_fields() {
        let record = parse_booking(BOOKING).unwrap();
        insta::assert_debug_snapshot!(record, @r#"
        EventRecord {
            title: "NR45 Endurance",
            venue: "NIGHTRIDE",
            start_time: "Tuesday, 5. March 2024 18:00",
            duration: Some(
                45,
            ),
            end_time: None,
            location: Some(
                "Torstraße 1, 10119 Berlin",
            ),
            coach: Some(
                "Anna",
            ),
        }
        "#);
    }

    #[test]
    fn duration_is_the_digit_run_after_nr() {
        let text = "You booked NR30 Sprint on 6. March 2024 07:00 with Ben\naddress is Main 2 / 12345 Köln";
        let record = parse_booking(text).unwrap();
        assert_eq!(record.title, "NR30 Sprint");
        assert_eq!(record.duration, Some(30));
        assert_eq!(record.location.as_deref(), Some("Main 2, 12345 Köln"));
    }

    #[test]
    fn missing_sentence_names_event() {
        let err = parse_booking("Thanks for riding with us").unwrap_err();
        assert_eq!(err.field(), Some("event"));
    }

    #[test]
    fn title_without_minutes_names_duration() {
        let text = "You booked NRX Special on 6. March 2024 07:00 with Ben\naddress is Main 2 / 12345 Köln";
        let err = parse_booking(text).unwrap_err();
        assert_eq!(err.field(), Some("duration"));
    }

    #[test]
    fn missing_address_names_location() {
        let text = "You booked NR30 Sprint on 6. March 2024 07:00 with Ben";
        let err = parse_booking(text).unwrap_err();
        assert_eq!(err.field(), Some("location"));
    }

    #[test]
    fn cancellation_fields() {
        let record = parse_cancellation(CANCELLATION).unwrap();
        assert_eq!(record.title, "NR45 Endurance");
        assert_eq!(record.venue, "NIGHTRIDE Mitte");
        assert_eq!(record.start_time, "5. March 2024 18:00");
        assert_eq!(record.coach.as_deref(), Some("Anna"));
        assert!(record.duration.is_none());
    }

    #[test]
    fn cancellation_without_sentence_fails() {
        let err = parse_cancellation(BOOKING).unwrap_err();
        assert_eq!(err.field(), Some("event"));
    }
}
