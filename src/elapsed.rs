//! Elapsed-time formatting.
//!
//! Four fixed-unit formatters plus an automatic one. The active formatter is
//! picked once from `SCOPE_TIMER_FORMAT` and cached as a plain function
//! pointer, so the drop path of every timer calls straight through it without
//! looking at configuration again.

use std::fmt::{self, Write};
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::config;
use crate::error::ScopeTimerError;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Unit used to display elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// Pick the largest unit the duration reaches.
    #[default]
    Auto,
    Seconds,
    Millis,
    Micros,
    Nanos,
}

/// Signature shared by all elapsed formatters.
pub type FormatterFn = fn(u64, &mut dyn Write);

impl TimeFormat {
    /// Returns the formatter implementing this mode.
    pub fn formatter(self) -> FormatterFn {
        match self {
            TimeFormat::Auto => fmt_auto,
            TimeFormat::Seconds => fmt_seconds,
            TimeFormat::Millis => fmt_millis,
            TimeFormat::Micros => fmt_micros,
            TimeFormat::Nanos => fmt_nanos,
        }
    }
}

impl FromStr for TimeFormat {
    type Err = ScopeTimerError;

    /// Exact, case-insensitive match against `SECONDS`, `MILLIS`, `MICROS`,
    /// `NANOS`. Surrounding whitespace is not ignored.
    /// `AUTO` is accepted as well; anything else is an error the caller is
    /// expected to turn into [`TimeFormat::Auto`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = [
            ("SECONDS", TimeFormat::Seconds),
            ("MILLIS", TimeFormat::Millis),
            ("MICROS", TimeFormat::Micros),
            ("NANOS", TimeFormat::Nanos),
            ("AUTO", TimeFormat::Auto),
        ]
        .into_iter()
        .find(|(name, _)| s.eq_ignore_ascii_case(name))
        .map(|(_, mode)| mode);

        mode.ok_or_else(|| ScopeTimerError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFormat::Auto => "AUTO",
            TimeFormat::Seconds => "SECONDS",
            TimeFormat::Millis => "MILLIS",
            TimeFormat::Micros => "MICROS",
            TimeFormat::Nanos => "NANOS",
        };
        f.write_str(name)
    }
}

// Writes into FixedBuf never fail, so results are ignored throughout.

/// `<sec>.<ms>s`
pub fn fmt_seconds(ns: u64, out: &mut dyn Write) {
    let sec = ns / NANOS_PER_SEC;
    let rem_ms = (ns / NANOS_PER_MILLI) % 1_000;
    let _ = write!(out, "{}.{:03}s", sec, rem_ms);
}

/// `<ms>.<us>ms`
pub fn fmt_millis(ns: u64, out: &mut dyn Write) {
    let ms = ns / NANOS_PER_MILLI;
    let rem_us = (ns / NANOS_PER_MICRO) % 1_000;
    let _ = write!(out, "{}.{:03}ms", ms, rem_us);
}

/// `<us>.<ns>us`
pub fn fmt_micros(ns: u64, out: &mut dyn Write) {
    let us = ns / NANOS_PER_MICRO;
    let rem_ns = ns % 1_000;
    let _ = write!(out, "{}.{:03}us", us, rem_ns);
}

/// `<ns>ns`
pub fn fmt_nanos(ns: u64, out: &mut dyn Write) {
    let _ = write!(out, "{}ns", ns);
}

/// Seconds from 1s, milliseconds from 1ms, microseconds from 1us, else nanoseconds.
pub fn fmt_auto(ns: u64, out: &mut dyn Write) {
    if ns >= NANOS_PER_SEC {
        fmt_seconds(ns, out);
    } else if ns >= NANOS_PER_MILLI {
        fmt_millis(ns, out);
    } else if ns >= NANOS_PER_MICRO {
        fmt_micros(ns, out);
    } else {
        fmt_nanos(ns, out);
    }
}

lazy_static! {
    static ref ACTIVE_FORMATTER: FormatterFn = config::global().format.formatter();
}

/// Formatter chosen for this process.
#[inline]
pub fn active_formatter() -> FormatterFn {
    *ACTIVE_FORMATTER
}

/// Formats `ns` with the process-wide formatter.
#[inline]
pub fn format_elapsed(ns: u64, out: &mut dyn Write) {
    (*ACTIVE_FORMATTER)(ns, out)
}

/// Convenience wrapper returning an owned string, for tools and tests.
pub fn format_with(format: TimeFormat, ns: u64) -> String {
    let mut s = String::new();
    format.formatter()(ns, &mut s);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("seconds".parse::<TimeFormat>().unwrap(), TimeFormat::Seconds);
        assert_eq!("Millis".parse::<TimeFormat>().unwrap(), TimeFormat::Millis);
        assert_eq!("MICROS".parse::<TimeFormat>().unwrap(), TimeFormat::Micros);
        assert_eq!("nAnOs".parse::<TimeFormat>().unwrap(), TimeFormat::Nanos);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("WONKY".parse::<TimeFormat>().is_err());
        assert!("".parse::<TimeFormat>().is_err());
        assert!("MILLISECONDS".parse::<TimeFormat>().is_err());
    }

    #[test]
    fn test_parse_does_not_trim() {
        for padded in [" millis", "millis ", "\tNANOS", "seconds\n"] {
            assert!(padded.parse::<TimeFormat>().is_err(), "{padded:?}");
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [
            TimeFormat::Auto,
            TimeFormat::Seconds,
            TimeFormat::Millis,
            TimeFormat::Micros,
            TimeFormat::Nanos,
        ] {
            assert_eq!(mode.to_string().parse::<TimeFormat>().unwrap(), mode);
        }
    }

    #[test]
    fn test_remainders_are_zero_padded() {
        assert_eq!(format_with(TimeFormat::Seconds, 1_005_000_000), "1.005s");
        assert_eq!(format_with(TimeFormat::Millis, 3_042_000), "3.042ms");
        assert_eq!(format_with(TimeFormat::Micros, 7_009), "7.009us");
    }

    #[test]
    fn test_sub_unit_values_render_as_zero() {
        assert_eq!(format_with(TimeFormat::Seconds, 999_999), "0.000s");
        assert_eq!(format_with(TimeFormat::Millis, 999), "0.000ms");
        assert_eq!(format_with(TimeFormat::Micros, 0), "0.000us");
        assert_eq!(format_with(TimeFormat::Nanos, 0), "0ns");
    }

    #[test]
    fn test_auto_thresholds() {
        assert_eq!(format_with(TimeFormat::Auto, 999), "999ns");
        assert_eq!(format_with(TimeFormat::Auto, 1_000), "1.000us");
        assert_eq!(format_with(TimeFormat::Auto, 999_999), "999.999us");
        assert_eq!(format_with(TimeFormat::Auto, 1_000_000), "1.000ms");
        assert_eq!(format_with(TimeFormat::Auto, 999_999_999), "999.999ms");
        assert_eq!(format_with(TimeFormat::Auto, 1_000_000_000), "1.000s");
    }
}
