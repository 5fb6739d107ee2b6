//! Folding hour/minute text into a minute count.

use crate::error::{Error, Result};

/// Converts optional hours and minutes components into whole minutes.
///
/// Absent components count as zero, so two absent components yield `0`.
/// Applying a default for that case is up to the caller.
///
/// # Errors
///
/// Returns a `duration` parse error if a present component is not a
/// non-negative integer, or if the total overflows.
pub fn normalize_duration(hours: Option<&str>, minutes: Option<&str>) -> Result<u32> {
    let hours = component(hours, "hours")?;
    let minutes = component(minutes, "minutes")?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(|| Error::parse("duration", "duration out of range"))
}

fn component(text: Option<&str>, unit: &str) -> Result<u32> {
    match text.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<u32>()
            .map_err(|e| Error::parse("duration", format!("invalid {unit} '{value}': {e}"))),
    }
}
