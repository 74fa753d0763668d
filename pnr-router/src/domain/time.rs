//! Service-day time arithmetic for scheduled transit.
//!
//! Search states carry absolute times as Unix seconds. Transit schedules are
//! expressed as seconds after midnight (UTC) of the service day, so hop
//! traversal converts between the two with the helpers below.

use chrono::{DateTime, Utc};

/// Length of a service day in seconds.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Error returned when parsing an invalid schedule time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Seconds elapsed since the start of the service day containing `epoch`.
pub fn seconds_of_day(epoch: i64) -> i64 {
    epoch.rem_euclid(SECONDS_PER_DAY)
}

/// Unix seconds of the midnight starting the service day containing `epoch`.
pub fn day_start(epoch: i64) -> i64 {
    epoch - seconds_of_day(epoch)
}

/// Converts Unix seconds back into a timestamp.
pub fn to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(epoch, 0)
}

/// Parse a schedule time in "HH:MM" format into seconds after midnight.
///
/// # Examples
///
/// ```
/// use pnr_router::domain::parse_hhmm;
///
/// assert_eq!(parse_hhmm("07:30"), Ok(27_000));
/// assert!(parse_hhmm("7:30").is_err());
/// assert!(parse_hhmm("24:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<u32, TimeError> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }
    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }
    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    Ok(hour * 3600 + minute * 60)
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// Regular departures from `first` up to and including `last`, every
/// `headway_mins` minutes.
pub fn departures_every(first: &str, last: &str, headway_mins: u32) -> Result<Vec<u32>, TimeError> {
    if headway_mins == 0 {
        return Err(TimeError::new("headway must be positive"));
    }
    let start = parse_hhmm(first)?;
    let end = parse_hhmm(last)?;
    if end < start {
        return Err(TimeError::new("last departure before first"));
    }
    Ok((start..=end).step_by(headway_mins as usize * 60).collect())
}

/// Format seconds after midnight as "HH:MM".
pub fn format_hhmm(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60)
}
