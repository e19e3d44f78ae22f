#![cfg(not(feature = "noop"))]

mod common;

use std::thread;
use std::time::Duration;

use scope_timer::log_reader::strip_timestamps;
use scope_timer::summary::{summarize, Trend};
use scope_timer::{scope_timer, LogReader};

fn step(pause: Duration) {
    scope_timer!("step");
    thread::sleep(pause);
}

#[test]
fn test_read_back_captured_log() {
    let captured = common::capture();
    for _ in 0..3 {
        step(Duration::from_micros(300));
    }
    {
        scope_timer!(format!("batch of {}", 3));
    }

    let contents = captured.sink.contents();
    let mut reader = LogReader::new(&contents);
    let mut seen = Vec::new();
    while let Some(record) = reader.read_entry() {
        seen.push(record);
    }
    assert_eq!(reader.skipped(), 0);
    assert_eq!(seen.len(), 4);
    assert!(seen[..3].iter().all(|r| r.label == "step"));
    assert!(seen[..3].iter().all(|r| r.location.ends_with("::step")));
    assert!(seen[..3].iter().all(|r| r.elapsed >= Duration::from_micros(300)));
    assert_eq!(seen[3].label, "batch of 3");
}

#[test]
fn test_summary_of_captured_log() {
    let captured = common::capture();
    for i in 0..6u64 {
        step(Duration::from_millis(1 + i * 2));
    }

    let records = captured.records();
    let groups = summarize(&records);
    assert_eq!(groups.len(), 1);

    let stats = &groups[0];
    assert!(stats.key.starts_with("[step] "));
    assert_eq!(stats.count(), 6);
    assert!(stats.min() >= Duration::from_millis(1));
    assert!(stats.max() >= Duration::from_millis(11));
    assert!(stats.min() <= stats.avg() && stats.avg() <= stats.max());
    assert_eq!(stats.trend(), Trend::Rising);
    assert!(stats.to_string().contains("count=6"));
}

#[test]
fn test_strip_timestamps_of_captured_lines() {
    let captured = common::capture();
    {
        scope_timer!("stripped");
    }

    let line = &captured.sink.lines()[0];
    let stripped = strip_timestamps(line);
    assert!(stripped.starts_with("[stripped] "), "{stripped}");
    assert!(!stripped.contains("TID="));
    assert!(!stripped.contains("start="));
    assert!(!stripped.contains("end="));
    assert!(stripped.contains(" | elapsed="));
}

#[test]
fn test_reader_skips_foreign_lines() {
    let log = "\
# header written by hand
[ok] TID=001 | f | start=2025-01-01 00:00:00.000 | end=2025-01-01 00:00:00.002 | elapsed=2.000ms

[broken] TID=001 | f | start=2025-01-01 00:00:00.000
";
    let mut reader = LogReader::new(log);
    let records: Vec<_> = reader.by_ref().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].elapsed, Duration::from_millis(2));
    assert_eq!(reader.skipped(), 2);
}
