//! Reading timer logs back.
//!
//! Timer lines are plain text, so everything downstream (filters, summaries,
//! test assertions) goes through the parser here rather than ad hoc string
//! slicing.

use std::fmt;
use std::str::Lines;
use std::time::Duration;

use crate::error::{Result, ScopeTimerError};

/// One parsed timer line.
///
/// # Examples
///
/// ```
/// # use scope_timer::log_reader::parse_line;
/// # use std::time::Duration;
/// let record = parse_line(
///     "[load] TID=003 | app::load | start=2025-08-13 11:57:21.832 \
///      | end=2025-08-13 11:57:21.834 | elapsed=2.013ms",
/// ).unwrap();
///
/// assert_eq!(record.label, "load");
/// assert_eq!(record.thread_id, 3);
/// assert_eq!(record.location, "app::load");
/// assert_eq!(record.elapsed, Duration::from_micros(2_013));
/// assert_eq!(record.filtered(), "[load] app::load | elapsed=2.013ms");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRecord {
    pub label: String,
    pub thread_id: u32,
    pub location: String,
    pub start: String,
    pub end: String,
    /// The elapsed token exactly as written, unit included.
    pub elapsed_text: String,
    pub elapsed: Duration,
}

impl TimerRecord {
    /// `[label] location`, the key lines are grouped by.
    pub fn key(&self) -> String {
        format!("[{}] {}", self.label, self.location)
    }

    /// The line without `TID=`, `start=` and `end=`.
    pub fn filtered(&self) -> String {
        format!("{} | elapsed={}", self.key(), self.elapsed_text)
    }

    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }
}

impl fmt::Display for TimerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] TID={:03} | {} | start={} | end={} | elapsed={}",
            self.label, self.thread_id, self.location, self.start, self.end, self.elapsed_text
        )
    }
}

/// Parses one line, with or without its trailing newline.
pub fn parse_line(line: &str) -> Result<TimerRecord> {
    let malformed = || ScopeTimerError::MalformedLine(line.to_string());
    let line = line.trim_end_matches(['\n', '\r']);

    let rest = line.strip_prefix('[').ok_or_else(malformed)?;
    let (label, rest) = rest.split_once("] TID=").ok_or_else(malformed)?;
    let (tid, rest) = rest.split_once(" | ").ok_or_else(malformed)?;
    if tid.is_empty() || !tid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let thread_id = tid.parse::<u32>().map_err(|_| malformed())?;

    // Scan the fixed fields from the right so that a location containing
    // " | " is still read whole.
    let (rest, elapsed_text) = rest.rsplit_once(" | elapsed=").ok_or_else(malformed)?;
    let (rest, end) = rest.rsplit_once(" | end=").ok_or_else(malformed)?;
    let (location, start) = rest.rsplit_once(" | start=").ok_or_else(malformed)?;

    let elapsed = parse_elapsed(elapsed_text).ok_or_else(malformed)?;

    Ok(TimerRecord {
        label: label.to_string(),
        thread_id,
        location: location.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        elapsed_text: elapsed_text.to_string(),
        elapsed,
    })
}

/// Parses an elapsed token such as `2.500s`, `1000.000ms`, `3.042us` or `500ns`.
pub fn parse_elapsed(token: &str) -> Option<Duration> {
    // "ns", "us" and "ms" must be tried before the bare "s"
    let (number, unit_nanos) = [("ns", 1u64), ("us", 1_000), ("ms", 1_000_000), ("s", 1_000_000_000)]
        .into_iter()
        .find_map(|(suffix, nanos)| token.strip_suffix(suffix).map(|n| (n, nanos)))?;

    let (whole, frac) = match number.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (number, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) || frac.len() > 9 {
        return None;
    }

    let whole: u64 = whole.parse().ok()?;
    let frac_nanos = if frac.is_empty() {
        0
    } else {
        let digits: u64 = frac.parse().ok()?;
        digits * unit_nanos / 10u64.pow(frac.len() as u32)
    };

    whole
        .checked_mul(unit_nanos)
        .and_then(|n| n.checked_add(frac_nanos))
        .map(Duration::from_nanos)
}

/// Drops the `TID=`, `start=` and `end=` fields from a timer line. Lines
/// that are not timer lines come back unchanged.
pub fn strip_timestamps(line: &str) -> String {
    match parse_line(line) {
        Ok(record) => record.filtered(),
        Err(_) => line.trim_end_matches(['\n', '\r']).to_string(),
    }
}

/// Iterates over the timer lines of a log, skipping anything else.
///
/// ```
/// # use scope_timer::LogReader;
/// let log = "\
/// [a] TID=001 | f | start=2025-01-01 00:00:00.000 | end=2025-01-01 00:00:00.001 | elapsed=1.000ms
/// garbage
/// [b] TID=002 | g | start=2025-01-01 00:00:00.000 | end=2025-01-01 00:00:00.000 | elapsed=12ns
/// ";
/// let mut reader = LogReader::new(log);
/// assert_eq!(reader.read_entry().unwrap().label, "a");
/// assert_eq!(reader.read_entry().unwrap().label, "b");
/// assert!(reader.read_entry().is_none());
/// assert_eq!(reader.skipped(), 1);
/// ```
pub struct LogReader<'a> {
    lines: Lines<'a>,
    skipped: usize,
}

impl<'a> LogReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            skipped: 0,
        }
    }

    /// Next well-formed record, or `None` at the end of the text.
    pub fn read_entry(&mut self) -> Option<TimerRecord> {
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(record) => return Some(record),
                Err(_) => self.skipped += 1,
            }
        }
        None
    }

    /// Non-empty lines that did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for LogReader<'_> {
    type Item = TimerRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_entry()
    }
}
