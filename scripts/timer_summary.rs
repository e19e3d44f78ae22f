//! Post-processing for `ScopeTimer.log`.
//!
//! ```text
//! timer_summary [--filter] [FILE]
//! ```
//!
//! Without `--filter`, prints one summary line per `[label] location` group.
//! With it, prints every line with `TID=`, `start=` and `end=` removed.
//! Reads standard input when no file is given.

use std::env;
use std::fs;
use std::io::{self, Read, Write};

use scope_timer::log_reader::strip_timestamps;
use scope_timer::summary::summarize;
use scope_timer::LogReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut filter_only = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--filter" => filter_only = true,
            "-h" | "--help" => {
                println!("usage: timer_summary [--filter] [FILE]");
                return Ok(());
            }
            _ => path = Some(arg),
        }
    }

    let text = match path {
        Some(path) => fs::read_to_string(&path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if filter_only {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(out, "{}", strip_timestamps(line))?;
        }
        return Ok(());
    }

    let mut reader = LogReader::new(&text);
    let records: Vec<_> = reader.by_ref().collect();
    debug!(records = records.len(), skipped = reader.skipped(), "log parsed");

    for group in summarize(&records) {
        writeln!(out, "{group}")?;
    }
    Ok(())
}
