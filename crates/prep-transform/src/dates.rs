//! Date parsing and age arithmetic.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Parse a trimmed value with a strftime-style format.
///
/// Formats without a time component parse to midnight.
pub fn parse_datetime(value: &str, format: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Milliseconds since the Unix epoch, the unit stored in datetime columns.
pub fn to_epoch_millis(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp_millis()
}

pub fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Signed number of whole calendar years from `start` to `end`.
///
/// Months are added to `start` with end-of-month clamping (29 February plus
/// one year is 28 February), and the result is truncated toward zero, so a
/// `start` less than a year after `end` yields 0.
pub fn whole_years_between(start: NaiveDate, end: NaiveDate) -> Option<i32> {
    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    let mut shifted = shift_months(start, months)?;
    if end < start {
        while end > shifted {
            months += 1;
            shifted = shift_months(start, months)?;
        }
    } else {
        while end < shifted {
            months -= 1;
            shifted = shift_months(start, months)?;
        }
    }
    Some(months / 12)
}

/// Age in whole years at `reference`, or `None` when it would be negative.
pub fn age_at(birth: NaiveDate, reference: NaiveDate) -> Option<i64> {
    whole_years_between(birth, reference)
        .filter(|years| *years >= 0)
        .map(i64::from)
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let magnitude = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}
