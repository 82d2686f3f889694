use chrono::{NaiveDate, NaiveDateTime};

use crate::models::AppointmentError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp into the wall-clock time it names.
///
/// A trailing `Z`, `±HH`, `±HHMM` or `±HH:MM` is accepted but not applied:
/// `09:00+02:00` stays `09:00`.
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime, AppointmentError> {
    let value = input.trim();
    let invalid = || AppointmentError::InvalidTimestamp(value.to_string());

    let local = strip_offset(value).ok_or_else(invalid)?;

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(local, format).ok())
        .ok_or_else(invalid)
}

/// Returns `value` without its UTC offset, or `None` if the offset is malformed.
fn strip_offset(value: &str) -> Option<&str> {
    if let Some(local) = value.strip_suffix(['Z', 'z']) {
        return Some(local);
    }

    // Offsets can only follow the time part; the date itself contains '-'.
    let time_start = value.find(['T', ' '])?;
    match value[time_start..].rfind(['+', '-']) {
        Some(at) => {
            let sign = time_start + at;
            is_offset(&value[sign + 1..]).then(|| &value[..sign])
        }
        None => Some(value),
    }
}

fn is_offset(offset: &str) -> bool {
    if !offset.is_ascii() {
        return false;
    }

    let (hours, minutes) = match offset.len() {
        2 => (offset, "00"),
        4 => offset.split_at(2),
        5 if offset.as_bytes()[2] == b':' => (&offset[..2], &offset[3..]),
        _ => return false,
    };

    let in_range = |digits: &str, limit: u32| {
        digits.bytes().all(|b| b.is_ascii_digit())
            && digits.parse::<u32>().is_ok_and(|n| n < limit)
    };
    in_range(hours, 24) && in_range(minutes, 60)
}

/// Parses a `YYYY-MM-DD` date. The last representable date is rejected because
/// its day has no upper bound.
pub fn parse_date(input: &str) -> Result<NaiveDate, AppointmentError> {
    let value = input.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .filter(|date| date.succ_opt().is_some())
        .ok_or_else(|| AppointmentError::InvalidDate(value.to_string()))
}
