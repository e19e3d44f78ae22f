use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};

use crate::buffer::FixedBuf;

/// Room for `YYYY-MM-DD HH:MM:SS.mmm` plus terminator, with slack for
/// five-digit years.
pub const TIMESTAMP_BUF_SIZE: usize = 32;

pub type TimestampBuf = FixedBuf<TIMESTAMP_BUF_SIZE>;

/// Formats a wall-clock instant as `YYYY-MM-DD HH:MM:SS.mmm` in local time.
///
/// Milliseconds are truncated, never rounded. Conversion goes through
/// `chrono`, which does not share calendar state between threads.
pub fn format_timestamp(at: SystemTime, out: &mut dyn Write) {
    // clocks set before 1970 are reported as the epoch
    let since_epoch = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = i64::try_from(since_epoch.as_secs()).unwrap_or(i64::MAX);

    match DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos()) {
        Some(utc) => write_datetime(&utc.with_timezone(&Local), out),
        None => {
            let _ = out.write_str("0000-00-00 00:00:00.000");
        }
    }
}

/// Same layout for any time zone; used where a fixed zone is needed.
pub fn write_datetime<Tz: TimeZone>(at: &DateTime<Tz>, out: &mut dyn Write) {
    // nanosecond() exceeds 1e9 during a leap second
    let millis = (at.nanosecond() % 1_000_000_000) / 1_000_000;
    let naive = at.naive_local();
    let _ = write!(out, "{}.{:03}", naive.format("%Y-%m-%d %H:%M:%S"), millis);
}

/// Formats into a fresh fixed-size buffer.
pub fn timestamp_buf(at: SystemTime) -> TimestampBuf {
    let mut buf = TimestampBuf::new();
    format_timestamp(at, &mut buf);
    buf
}
