//! Time utilities: local wall-clock "now", hour-of-week slots, plan start times.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone like "Asia/Tokyo".
pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Wall-clock time in `tz` for a UTC instant.
pub fn local_naive(now: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    now.with_timezone(&tz).naive_local()
}

/// Hour-of-week slot `(day_of_week, hour)`, 0 = Monday.
pub fn slot_of(dt: NaiveDateTime) -> (u32, u32) {
    (dt.weekday().num_days_from_monday(), dt.hour())
}

/// Round up to the next quarter-hour boundary (unchanged if already on one).
pub fn next_quarter_hour(dt: NaiveDateTime) -> NaiveDateTime {
    let floored = dt
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt);
    let rem = floored.minute() % 15;
    let on_boundary = rem == 0 && floored == dt;
    if on_boundary {
        return dt;
    }
    floored + Duration::minutes(i64::from(15 - rem))
}

/// Parse a plan start like "18:30" on `date`.
pub fn parse_start(date: NaiveDate, hhmm: &str) -> Result<NaiveDateTime> {
    let t = NaiveTime::parse_from_str(hhmm.trim(), "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid start time '{hhmm}' (expected HH:MM): {e}"))?;
    Ok(date.and_time(t))
}
