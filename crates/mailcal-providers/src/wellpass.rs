//! Wellpass (gym pass) mails.
//!
//! Title and venue come from the subject (`Booking confirmed: Yoga Flow at
//! Studio One`); date, time, duration and address come from labelled body
//! lines.

use std::sync::LazyLock;

use mailcal_core::{Error, EventRecord, Result, normalize_duration};
use regex::{Captures, Regex};

static BOOKING_SUBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Booking.*:\s(?P<title>\w+(.\w+)*)\sat\s(?P<venue>\w+(.\w+)*)")
        .expect("Invalid Wellpass booking subject regex")
});

static CANCELLATION_SUBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Cancellation.*:\s(?P<title>\w+(.\w+)*)\sat\s(?P<venue>\w+(.\w+)*)")
        .expect("Invalid Wellpass cancellation subject regex")
});

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Date:.?\s\w+,\s(?P<longdate>.+)").expect("Invalid Wellpass date regex")
});

static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Time:.?\s(?P<time>\d+:\d{2}\s?(AM|PM)?)").expect("Invalid Wellpass time regex")
});

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:.?\s((?P<hours>\d+)\shours?)?\s?((?P<minutes>\d+)\sminutes?)?")
        .expect("Invalid Wellpass duration regex")
});

static LOCATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Address|Location):.?\s(?P<location>.+)").expect("Invalid Wellpass location regex")
});

/// `on 5.3.24 · at 6:00 PM`, `on 05.03.2024 at 18:00`
static CANCELLATION_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"on\s+(..)?(?P<day>\d+)\.(?P<month>\d+)\.(?P<year>\d{2}(\d{2})?)\s+(.\s+)?at\s+(.\s+)?(?P<time>\d+:\d{2}\s?(AM|PM)?)",
    )
    .expect("Invalid Wellpass cancellation date regex")
});

/// Parses a booking confirmation.
///
/// A duration line that states neither hours nor minutes leaves the
/// duration unset, so the configured default applies.
///
/// # Errors
///
/// Returns a parse error naming `subject`, `date`, `time`, `duration` or
/// `location` for the first missing line.
pub fn parse_booking(text: &str, subject: &str) -> Result<EventRecord> {
    let event = BOOKING_SUBJECT_REGEX
        .captures(subject)
        .ok_or_else(|| Error::parse("subject", "no 'Booking…: <title> at <venue>' subject"))?;

    let date = DATE_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("date", "no 'Date: <weekday>, <date>' line"))?;
    let time = TIME_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("time", "no 'Time: H:MM' line"))?;
    let start = format!("{} {}", group(&date, "longdate"), group(&time, "time"));

    let duration = DURATION_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("duration", "no 'Duration:' line"))?;
    let minutes = normalize_duration(
        duration.name("hours").map(|m| m.as_str()),
        duration.name("minutes").map(|m| m.as_str()),
    )?;

    let location = LOCATION_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("location", "no 'Address:' or 'Location:' line"))?;

    let mut record = EventRecord::new(group(&event, "title"), group(&event, "venue"), start)
        .with_location(group(&location, "location"));
    if minutes > 0 {
        record = record.with_duration(minutes);
    }
    Ok(record)
}

/// Parses a cancellation notice.
///
/// Title and venue are read from the subject, or from the body when the
/// subject does not carry them. The start is assembled as
/// `<year>-<month>-<day> <time>`, two-digit years read as `20YY`.
///
/// # Errors
///
/// Returns a `subject` or `date` parse error when either grammar fails.
pub fn parse_cancellation(text: &str, subject: &str) -> Result<EventRecord> {
    let date = CANCELLATION_DATE_REGEX
        .captures(text)
        .ok_or_else(|| Error::parse("date", "no 'on D.M.YY at H:MM' phrase"))?;

    let event = CANCELLATION_SUBJECT_REGEX
        .captures(subject)
        .or_else(|| CANCELLATION_SUBJECT_REGEX.captures(text))
        .ok_or_else(|| Error::parse("subject", "no 'Cancellation…: <title> at <venue>' line"))?;

    let year = group(&date, "year");
    let year = if year.len() == 2 {
        format!("20{year}")
    } else {
        year.to_string()
    };
    let start = format!(
        "{}-{}-{} {}",
        year,
        group(&date, "month"),
        group(&date, "day"),
        group(&date, "time")
    );

    Ok(EventRecord::new(
        group(&event, "title"),
        group(&event, "venue"),
        start,
    ))
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: &str = "Booking confirmed: Yoga Flow at Studio One";

    fn body(duration_line: &str) -> String {
        format!(
            "Hello,\r\n\
             your booking is confirmed.\r\n\
             Date: Tuesday, March 5, 2024\r\n\
             Time: 6:00 PM\r\n\
             {duration_line}\r\n\
             Address: Main Street 1, 10115 Berlin\r\n"
        )
    }

    #[test]
    fn booking_fields() {
        let record = parse_booking(&body("Duration: 1 hour 30 minutes"), SUBJECT).unwrap();
        insta::assert_debug_snapshot!(record, @r#"
        EventRecord {
            title: "Yoga Flow",
            venue: "Studio One",
            start_time: "March 5, 2024 6:00 PM",
            duration: Some(
                90,
            ),
            end_time: None,
            location: Some(
                "Main Street 1, 10115 Berlin",
            ),
            coach: None,
        }
        "#);
    }

    #[test]
    fn duration_variants() {
        let cases = [
            ("Duration: 2 hours 30 minutes", Some(150)),
            ("Duration: 45 minutes", Some(45)),
            ("Duration: 1 hour", Some(60)),
            ("Duration: flexible", None),
        ];
        for (line, expected) in cases {
            let record = parse_booking(&body(line), SUBJECT).unwrap();
            assert_eq!(record.duration, expected, "{line}");
        }
    }

    #[test]
    fn missing_duration_line_fails() {
        let text = body("").replace("Duration", "");
        let err = parse_booking(&text, SUBJECT).unwrap_err();
        assert_eq!(err.field(), Some("duration"));
    }

    #[test]
    fn location_label_is_accepted() {
        let text = body("Duration: 45 minutes").replace("Address:", "Location:");
        let record = parse_booking(&text, SUBJECT).unwrap();
        assert_eq!(record.location.as_deref(), Some("Main Street 1, 10115 Berlin"));
    }

    #[test]
    fn wrong_subject_fails_first() {
        let err = parse_booking(&body("Duration: 45 minutes"), "Your receipt").unwrap_err();
        assert_eq!(err.field(), Some("subject"));
    }

    #[test]
    fn missing_time_fails() {
        let text = body("Duration: 45 minutes").replace("Time: 6:00 PM", "");
        let err = parse_booking(&text, SUBJECT).unwrap_err();
        assert_eq!(err.field(), Some("time"));
    }

    #[test]
    fn cancellation_assembles_iso_like_start() {
        let text = "Your class on 5.3.24 · at 6:00 PM has been cancelled.";
        let record =
            parse_cancellation(text, "Cancellation confirmed: Yoga Flow at Studio One").unwrap();
        assert_eq!(record.title, "Yoga Flow");
        assert_eq!(record.venue, "Studio One");
        assert_eq!(record.start_time, "2024-3-5 6:00 PM");
        assert!(record.location.is_none());
    }

    #[test]
    fn cancellation_with_four_digit_year() {
        let text = "Your class on 05.03.2024 at 18:00 has been cancelled.";
        let record = parse_cancellation(text, "Cancellation: Spin at Gym East").unwrap();
        assert_eq!(record.start_time, "2024-03-05 18:00");
    }

    #[test]
    fn cancellation_subject_falls_back_to_body() {
        let text = "Cancellation: Spin at Gym East\nYour class on 05.03.2024 at 18:00 is off.";
        let record = parse_cancellation(text, "Fwd: class update").unwrap();
        assert_eq!(record.title, "Spin");
        assert_eq!(record.venue, "Gym East");
    }

    #[test]
    fn cancellation_without_date_fails() {
        let err = parse_cancellation("cancelled", "Cancellation: Spin at Gym").unwrap_err();
        assert_eq!(err.field(), Some("date"));
    }
}
