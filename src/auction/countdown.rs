//! Remaining-time arithmetic for auctions.
//!
//! Pure functions over two timestamps. The sentinel-returning helpers keep the
//! wire behaviour clients already rely on (`-1`, `0000-00-00T00:00`); server
//! code uses the `Result` variants so an unparseable date is never mistaken
//! for an ended auction.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Returned by [`convert_date_time`] for unparseable input.
pub const INVALID_DATE_TIME: &str = "0000-00-00T00:00";

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unparseable timestamp '{0}'")]
pub struct CountdownError(pub String);

/// Parse the timestamp formats clients send. Naive values are read as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, CountdownError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(CountdownError(input.to_string()))
}

/// Whole seconds from `now` until `end`, rounded towards negative infinity.
pub fn seconds_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end - now).num_milliseconds().div_euclid(1000)
}

/// Seconds remaining until `end`, or `-1` when `end` cannot be parsed.
pub fn calculate_time_remaining(end: &str, now: DateTime<Utc>) -> i64 {
    match parse_timestamp(end) {
        Ok(end) => seconds_until(end, now),
        Err(_) => -1,
    }
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM` (UTC), or [`INVALID_DATE_TIME`].
pub fn convert_date_time(input: &str) -> String {
    match parse_timestamp(input) {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M").to_string(),
        Err(_) => INVALID_DATE_TIME.to_string(),
    }
}

/// Display policy: `Ended`, `N days`, or `H:MM:SS`.
pub fn format_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "Ended".to_string();
    }

    let days = seconds / SECONDS_PER_DAY;
    if days >= 1 {
        return format!("{days} days");
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Countdown snapshot for one auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub seconds_remaining: i64,
    pub display: String,
    pub started: bool,
    pub ended: bool,
}

impl Countdown {
    pub fn evaluate(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let seconds_remaining = seconds_until(end, now).max(0);
        // Bids are taken until `end` itself, including its last partial second
        let ended = now >= end;
        let display = if !ended && seconds_remaining == 0 {
            "0:00:00".to_string()
        } else {
            format_remaining(seconds_remaining)
        };
        Self {
            seconds_remaining,
            display,
            started: now >= start,
            ended,
        }
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn future_timestamp_gives_whole_seconds() {
        let now = fixed_now();
        assert_eq!(calculate_time_remaining("2026-03-01T12:01:30Z", now), 90);
        assert_eq!(calculate_time_remaining("2026-03-02T12:00:00+00:00", now), 86_400);
    }

    #[test]
    fn fractional_seconds_are_floored() {
        let now = fixed_now();
        let end = now + Duration::milliseconds(2_999);
        assert_eq!(seconds_until(end, now), 2);
        assert_eq!(
            calculate_time_remaining("2026-03-01T12:00:02.999Z", now),
            2
        );
    }

    #[test]
    fn naive_formats_are_utc() {
        let now = fixed_now();
        assert_eq!(calculate_time_remaining("2026-03-01T12:10", now), 600);
        assert_eq!(calculate_time_remaining("2026-03-01 12:00:10", now), 10);
        assert_eq!(calculate_time_remaining("2026-03-02", now), 12 * 3600);
    }

    #[test]
    fn unparseable_timestamp_is_minus_one() {
        assert_eq!(calculate_time_remaining("randomString", fixed_now()), -1);
        assert!(parse_timestamp("randomString").is_err());
    }

    #[test]
    fn convert_date_time_truncates_to_minutes() {
        assert_eq!(convert_date_time("2026-03-01T12:34:56Z"), "2026-03-01T12:34");
        assert_eq!(convert_date_time("2026-03-01T14:34:56+02:00"), "2026-03-01T12:34");
    }

    #[test]
    fn convert_date_time_sentinel() {
        assert_eq!(convert_date_time("randomString"), "0000-00-00T00:00");
    }

    #[test]
    fn display_policy() {
        assert_eq!(format_remaining(0), "Ended");
        assert_eq!(format_remaining(-5), "Ended");
        assert_eq!(format_remaining(59), "0:00:59");
        assert_eq!(format_remaining(3_661), "1:01:01");
        assert_eq!(format_remaining(86_399), "23:59:59");
        assert_eq!(format_remaining(86_400), "1 days");
        assert_eq!(format_remaining(3 * 86_400 + 7), "3 days");
    }

    #[test]
    fn countdown_snapshot() {
        let now = fixed_now();
        let running = Countdown::evaluate(now - Duration::hours(1), now + Duration::seconds(75), now);
        assert_eq!(running.seconds_remaining, 75);
        assert_eq!(running.display, "0:01:15");
        assert!(running.started && !running.ended);

        let ended = Countdown::evaluate(now - Duration::hours(2), now - Duration::hours(1), now);
        assert_eq!(ended.seconds_remaining, 0);
        assert_eq!(ended.display, "Ended");
        assert!(ended.ended);

        let last_moment =
            Countdown::evaluate(now - Duration::hours(1), now + Duration::milliseconds(400), now);
        assert_eq!(last_moment.seconds_remaining, 0);
        assert!(!last_moment.ended);
        assert_eq!(last_moment.display, "0:00:00");

        let at_end = Countdown::evaluate(now - Duration::hours(1), now, now);
        assert!(at_end.ended);

        let upcoming = Countdown::evaluate(now + Duration::hours(1), now + Duration::days(2), now);
        assert!(!upcoming.started);
        assert_eq!(upcoming.display, "2 days");
    }
}
// endregion: --- Tests
