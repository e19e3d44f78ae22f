//! Per-call-site statistics over parsed timer records.
//!
//! Records are grouped by `[label] location`. Each group reports how many
//! times it ran, min/avg/max elapsed time and whether the later samples got
//! slower or faster than the earlier ones.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::elapsed::{format_with, TimeFormat};
use crate::log_reader::TimerRecord;

/// Relative change between the halves of a series that counts as a trend.
const TREND_THRESHOLD: f64 = 0.10;
/// Fewer samples than this give no trend.
const TREND_MIN_SAMPLES: usize = 4;

/// Direction of a group's elapsed times over the course of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Steady,
    Insufficient,
}

impl Trend {
    /// Compares the mean of the second half of `samples` to the first half.
    pub fn of(samples: &[u64]) -> Self {
        if samples.len() < TREND_MIN_SAMPLES {
            return Trend::Insufficient;
        }
        let (first, second) = samples.split_at(samples.len() / 2);
        let mean = |s: &[u64]| s.iter().map(|&v| v as f64).sum::<f64>() / s.len() as f64;
        let (before, after) = (mean(first), mean(second));

        if before == 0.0 {
            return if after > 0.0 { Trend::Rising } else { Trend::Steady };
        }
        let change = (after - before) / before;
        if change > TREND_THRESHOLD {
            Trend::Rising
        } else if change < -TREND_THRESHOLD {
            Trend::Falling
        } else {
            Trend::Steady
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Steady => "steady",
            Trend::Insufficient => "n/a",
        })
    }
}

/// Statistics of one `[label] location` group.
#[derive(Debug, Clone)]
pub struct GroupStats {
    pub key: String,
    /// Elapsed nanoseconds, in log order.
    samples: Vec<u64>,
}

impl GroupStats {
    fn new(key: String) -> Self {
        Self {
            key,
            samples: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn min(&self) -> Duration {
        Duration::from_nanos(self.samples.iter().copied().min().unwrap_or(0))
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.samples.iter().copied().max().unwrap_or(0))
    }

    fn total_nanos(&self) -> u128 {
        self.samples.iter().map(|&v| u128::from(v)).sum()
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(saturating_u64(self.total_nanos()))
    }

    pub fn avg(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(saturating_u64(self.total_nanos() / n as u128)),
        }
    }

    pub fn trend(&self) -> Trend {
        Trend::of(&self.samples)
    }
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Duration| format_with(TimeFormat::Auto, saturating_u64(d.as_nanos()));
        write!(
            f,
            "{} | count={} min={} avg={} max={} trend={}",
            self.key,
            self.count(),
            show(self.min()),
            show(self.avg()),
            show(self.max()),
            self.trend()
        )
    }
}

fn saturating_u64(nanos: u128) -> u64 {
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

/// Groups records by `[label] location`, keeping the order in which groups
/// first appear.
pub fn summarize<'r, I>(records: I) -> Vec<GroupStats>
where
    I: IntoIterator<Item = &'r TimerRecord>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupStats> = Vec::new();

    for record in records {
        let key = record.key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupStats::new(key));
            groups.len() - 1
        });
        let nanos = saturating_u64(record.elapsed.as_nanos());
        groups[slot].samples.push(nanos);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_reader::parse_line;

    fn record(label: &str, elapsed: &str) -> TimerRecord {
        parse_line(&format!(
            "[{label}] TID=001 | f() | start=2025-01-01 00:00:00.000 | end=2025-01-01 00:00:00.000 | elapsed={elapsed}"
        ))
        .unwrap()
    }

    #[test]
    fn test_grouping_and_stats() {
        let records = vec![
            record("a", "1.000ms"),
            record("b", "5ns"),
            record("a", "3.000ms"),
            record("a", "2.000ms"),
        ];
        let groups = summarize(&records);
        assert_eq!(groups.len(), 2);

        let a = &groups[0];
        assert_eq!(a.key, "[a] f()");
        assert_eq!(a.count(), 3);
        assert_eq!(a.min(), Duration::from_millis(1));
        assert_eq!(a.max(), Duration::from_millis(3));
        assert_eq!(a.avg(), Duration::from_millis(2));
        assert_eq!(
            a.to_string(),
            "[a] f() | count=3 min=1.000ms avg=2.000ms max=3.000ms trend=n/a"
        );

        assert_eq!(groups[1].key, "[b] f()");
        assert_eq!(groups[1].count(), 1);
    }

    #[test]
    fn test_stats_near_the_top_of_the_range() {
        let groups = summarize(&[
            record("big", "18446744073.709s"),
            record("big", "18446744073.709s"),
        ]);
        let big = &groups[0];
        let each = Duration::from_millis(18_446_744_073_709);
        // the sum overflows u64 nanoseconds and saturates, the mean does not
        assert_eq!(big.total(), Duration::from_nanos(u64::MAX));
        assert_eq!(big.avg(), each);
        assert_eq!(big.max(), each);
        assert!(big.to_string().contains("avg=18446744073.709s"));
    }

    #[test]
    fn test_trend() {
        assert_eq!(Trend::of(&[1, 2, 3]), Trend::Insufficient);
        assert_eq!(Trend::of(&[10, 10, 20, 20]), Trend::Rising);
        assert_eq!(Trend::of(&[20, 20, 10, 10]), Trend::Falling);
        assert_eq!(Trend::of(&[10, 11, 10, 10]), Trend::Steady);
        assert_eq!(Trend::of(&[0, 0, 0, 0]), Trend::Steady);
        assert_eq!(Trend::of(&[0, 0, 1, 1]), Trend::Rising);
    }
}
