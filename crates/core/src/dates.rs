use chrono::{Datelike, NaiveDate, Utc, Weekday};

use crate::errors::{DutyError, DutyResult};

/// Internal and storage representation, ISO `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// User-facing input/output format, `DD-MM-YYYY`.
pub const USER_DATE_FORMAT: &str = "%d-%m-%Y";
/// Human-readable schedule format, e.g. `Mon Jan 02 2006`.
pub const HUMAN_DATE_FORMAT: &str = "%a %b %d %Y";
/// Compact format the calendar authority is queried with, `YYYYMMDD`.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

pub const DAYS_IN_WEEK: i64 = 7;

/// Current date in UTC. Duty dates are day-granular, so this is the
/// single moving reference point for "today" across the service.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse user-supplied date text ordered as day, month, year.
///
/// The separator between the parts is not fixed: `12-03-2024`,
/// `12.03.2024` and `12 03 2024` all parse to the same date. Day and
/// month may omit the leading zero; the year must be four digits.
pub fn parse_user_date(text: &str) -> DutyResult<NaiveDate> {
    let invalid = || DutyError::InvalidDate(text.trim().to_string());

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            parts.push(&text[s..i]);
        }
    }
    if let Some(s) = start {
        parts.push(&text[s..]);
    }

    let &[day, month, year] = parts.as_slice() else {
        return Err(invalid());
    };
    if day.len() > 2 || month.len() > 2 || year.len() != 4 {
        return Err(invalid());
    }

    // Lengths are checked, so these cannot overflow or fail to parse.
    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

pub fn format_user_date(date: NaiveDate) -> String {
    date.format(USER_DATE_FORMAT).to_string()
}

pub fn format_human_date(date: NaiveDate) -> String {
    date.format(HUMAN_DATE_FORMAT).to_string()
}
