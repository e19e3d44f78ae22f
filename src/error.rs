use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside the timing engine.
///
/// None of these ever reach instrumented code: configuration errors are
/// resolved to defaults and sink errors are dropped after a `tracing` event.
/// Only [`crate::log_reader`] hands `MalformedLine` back to its callers.
#[derive(Debug, Error)]
pub enum ScopeTimerError {
    #[error("invalid flush interval {0:?}, expected an integer in 1..=1000000")]
    InvalidFlushInterval(String),

    #[error("unknown elapsed format {0:?}")]
    UnknownFormat(String),

    #[error("cannot open log file {}: {source}", path.display())]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed timer line: {0}")]
    MalformedLine(String),
}

pub type Result<T> = std::result::Result<T, ScopeTimerError>;
