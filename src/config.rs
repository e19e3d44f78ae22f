//! Runtime configuration read from the process environment.
//!
//! | Variable              | Meaning                                      | Default |
//! |-----------------------|----------------------------------------------|---------|
//! | `SCOPE_TIMER`         | `OFF`/`FALSE`/`NO`/`0` disable all timers    | enabled |
//! | `SCOPE_TIMER_DIR`     | directory holding `ScopeTimer.log`           | `/tmp`  |
//! | `SCOPE_TIMER_FLUSH_N` | flush the log every N lines (1..=1000000)    | 256     |
//! | `SCOPE_TIMER_FORMAT`  | `SECONDS`/`MILLIS`/`MICROS`/`NANOS`          | auto    |
//!
//! The values are read once, on first use, and cached for the rest of the
//! process. Bad values fall back to the default silently; the fallback is only
//! reported as a `tracing` debug event.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use lazy_static::lazy_static;
use tracing::debug;

use crate::elapsed::TimeFormat;
use crate::error::{Result, ScopeTimerError};

pub const ENV_ENABLE: &str = "SCOPE_TIMER";
pub const ENV_DIR: &str = "SCOPE_TIMER_DIR";
pub const ENV_FLUSH_N: &str = "SCOPE_TIMER_FLUSH_N";
pub const ENV_FORMAT: &str = "SCOPE_TIMER_FORMAT";

pub const DEFAULT_LOG_DIR: &str = "/tmp";
pub const DEFAULT_FLUSH_INTERVAL: u32 = 256;
pub const MAX_FLUSH_INTERVAL: u32 = 1_000_000;
pub const LOG_FILE_NAME: &str = "ScopeTimer.log";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub enabled: bool,
    /// Log directory, always ending with exactly one `/`. Kept as raw OS
    /// text, so non-UTF-8 directories work.
    pub log_dir: PathBuf,
    pub flush_interval: u32,
    pub format: TimeFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: normalize_dir(OsStr::new(DEFAULT_LOG_DIR)),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            format: TimeFormat::Auto,
        }
    }
}

impl Config {
    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scope_timer::config::Config;
    /// # use scope_timer::TimeFormat;
    /// let config = Config::from_lookup(|name| match name {
    ///     "SCOPE_TIMER_FORMAT" => Some("millis".into()),
    ///     "SCOPE_TIMER_FLUSH_N" => Some("bogus".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.format, TimeFormat::Millis);
    /// assert_eq!(config.flush_interval, 256);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        // only the directory is used as raw bytes; the other values are text
        let text = |name: &str| lookup(name).map(|v| v.to_string_lossy().into_owned());

        let enabled = text(ENV_ENABLE).map_or(true, |v| !is_disabling_value(&v));

        let log_dir = resolve_log_dir(lookup(ENV_DIR).as_deref());

        let flush_interval = match text(ENV_FLUSH_N) {
            Some(raw) => parse_flush_interval(&raw).unwrap_or_else(|e| {
                debug!(error = %e, default = DEFAULT_FLUSH_INTERVAL, "using default flush interval");
                DEFAULT_FLUSH_INTERVAL
            }),
            None => DEFAULT_FLUSH_INTERVAL,
        };

        let format = match text(ENV_FORMAT) {
            Some(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|e: ScopeTimerError| {
                debug!(error = %e, "using automatic elapsed format");
                TimeFormat::Auto
            }),
            _ => TimeFormat::Auto,
        };

        Self {
            enabled,
            log_dir,
            flush_interval,
            format,
        }
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var_os(name))
    }
}

/// `OFF`, `FALSE`, `NO` and `0`, in any case, turn timing off.
pub fn is_disabling_value(value: &str) -> bool {
    ["OFF", "FALSE", "NO", "0"]
        .iter()
        .any(|candidate| value.eq_ignore_ascii_case(candidate))
}

/// Parses a flush interval: a decimal number in `1..=1000000`, optionally
/// preceded by whitespace and a `+`. Anything after the digits is an error.
pub fn parse_flush_interval(raw: &str) -> Result<u32> {
    let invalid = || ScopeTimerError::InvalidFlushInterval(raw.to_string());

    let trimmed = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<u64>() {
        Ok(v) if (1..=u64::from(MAX_FLUSH_INTERVAL)).contains(&v) => Ok(v as u32),
        _ => Err(invalid()),
    }
}

/// Picks the configured directory, or `/tmp` when unset or empty.
pub fn resolve_log_dir(configured: Option<&OsStr>) -> PathBuf {
    match configured {
        Some(dir) if !dir.is_empty() => normalize_dir(dir),
        _ => normalize_dir(OsStr::new(DEFAULT_LOG_DIR)),
    }
}

/// Ensures the path ends with exactly one `/`.
#[cfg(unix)]
pub fn normalize_dir(dir: &OsStr) -> PathBuf {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = dir.as_bytes();
    let end = bytes.iter().rposition(|&b| b != b'/').map_or(0, |i| i + 1);
    let mut normalized = Vec::with_capacity(end + 1);
    normalized.extend_from_slice(&bytes[..end]);
    normalized.push(b'/');
    PathBuf::from(OsString::from_vec(normalized))
}

#[cfg(not(unix))]
pub fn normalize_dir(dir: &OsStr) -> PathBuf {
    let text = dir.to_string_lossy();
    let mut normalized = text.trim_end_matches('/').to_string();
    normalized.push('/');
    PathBuf::from(normalized)
}

lazy_static! {
    static ref GLOBAL: Config = {
        let config = Config::from_env();
        debug!(
            enabled = config.enabled,
            log_dir = %config.log_dir.display(),
            flush_interval = config.flush_interval,
            format = %config.format,
            "scope timer configuration resolved"
        );
        config
    };
}

/// Process-wide configuration, resolved from the environment on first call.
#[inline]
pub fn global() -> &'static Config {
    &GLOBAL
}

/// True when timing was switched off through `SCOPE_TIMER`.
#[inline]
pub fn is_disabled() -> bool {
    !GLOBAL.enabled
}

#[inline]
pub fn flush_interval() -> u32 {
    GLOBAL.flush_interval
}
