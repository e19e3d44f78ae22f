//! # Scope Timer
//!
//! Low-overhead timing of code blocks for development builds.
//!
//! Put a timer at the top of a block; when the block is left, however that
//! happens, one line is appended to a log file:
//!
//! ```text
//! [load config] TID=001 | app::load_config | start=2025-08-13 11:57:21.832 | end=2025-08-13 11:57:21.835 | elapsed=3.012ms
//! ```
//!
//! ## Key Features
//!
//! * No heap allocation on the common path: literal labels are borrowed,
//!   lines are formatted into fixed per-thread buffers
//! * Lock-free timing; the only lock is held while the line is written
//! * Elapsed-time unit picked once per process, then called through a
//!   function pointer
//! * Runtime configuration through `SCOPE_TIMER*` environment variables
//!   (see [`config`])
//! * The `noop` cargo feature compiles every timer away without touching
//!   call sites
//!
//! ## Main Components
//!
//! * [`ScopeTimer`]: measures its own lifetime and logs on drop
//! * [`ConditionalScopeTimer`]: a timer behind a runtime condition
//! * [`Label`] / [`IntoLabel`]: borrowed-or-owned label resolution
//! * [`LogSink`]: where lines go; [`FileSink`] by default, swappable with
//!   [`set_sink`]
//! * [`LogReader`] and [`summary`]: parse and aggregate the resulting logs
//!
//! ## Quick Start
//!
//! ```
//! use scope_timer::{scope_timer, scope_timer_if};
//!
//! fn parse(input: &str, verbose: bool) -> usize {
//!     scope_timer!("parse");
//!     scope_timer_if!(verbose, format!("parse {} bytes", input.len()));
//!     input.split_whitespace().count()
//! }
//!
//! assert_eq!(parse("a b c", true), 3);
//! ```

pub mod buffer;
pub mod config;
pub mod elapsed;
pub mod error;
pub mod label;
pub mod log_reader;
pub mod sink;
pub mod summary;
pub mod thread_id;
pub mod timestamp;

#[cfg(not(feature = "noop"))]
mod timer;
#[cfg(feature = "noop")]
mod noop;

#[cfg(not(feature = "noop"))]
pub use timer::{ConditionalScopeTimer, ScopeTimer, LINE_BUF_SIZE};
#[cfg(feature = "noop")]
pub use noop::{ConditionalScopeTimer, ScopeTimer};

pub use config::Config;
pub use elapsed::TimeFormat;
pub use error::ScopeTimerError;
pub use label::{IntoLabel, Label, DEFAULT_LABEL};
pub use log_reader::{LogReader, TimerRecord};
pub use sink::{reset_sink, set_log_directory, set_sink, CaptureSink, FileSink, FnSink, LogSink};

#[doc(hidden)]
pub mod __private {
    const MARKER: &str = "::__scope_timer_marker";
    const CLOSURE: &str = "::{{closure}}";

    /// Turns the type name of the marker fn into the enclosing function's path.
    pub fn trim_function_name(raw: &'static str) -> &'static str {
        let mut name = raw.strip_suffix(MARKER).unwrap_or(raw);
        while let Some(outer) = name.strip_suffix(CLOSURE) {
            name = outer;
        }
        name
    }
}

/// Path of the enclosing function, e.g. `my_crate::db::load`.
///
/// ```
/// fn lookup() -> &'static str {
///     scope_timer::function_name!()
/// }
/// assert!(lookup().ends_with("lookup"));
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __scope_timer_marker() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::__private::trim_function_name(type_name_of(__scope_timer_marker))
    }};
}

/// Times the rest of the enclosing block.
///
/// `scope_timer!()` uses the default `ScopeTimer` label; `scope_timer!(label)`
/// takes anything implementing [`IntoLabel`]. The location is the enclosing
/// function's path. Each expansion binds its own hidden local, so several
/// timers can share a block.
///
/// ```
/// use scope_timer::scope_timer;
///
/// fn work(name: &String) {
///     scope_timer!();
///     scope_timer!("work:literal");
///     scope_timer!(name);
/// }
/// work(&"work:dynamic".to_string());
/// ```
#[cfg(not(feature = "noop"))]
#[macro_export]
macro_rules! scope_timer {
    () => {
        let _scope_timer_guard = $crate::ScopeTimer::new($crate::function_name!());
    };
    ($label:expr $(,)?) => {
        let _scope_timer_guard =
            $crate::ScopeTimer::with_label($crate::function_name!(), $label);
    };
}

/// Times the rest of the enclosing block when `cond` is true. The label
/// expression is evaluated only in that case.
///
/// ```
/// use scope_timer::scope_timer_if;
///
/// fn step(trace: bool) {
///     scope_timer_if!(trace, "step");
/// }
/// step(false);
/// step(true);
/// ```
#[cfg(not(feature = "noop"))]
#[macro_export]
macro_rules! scope_timer_if {
    ($cond:expr $(,)?) => {
        let _scope_timer_guard =
            $crate::ConditionalScopeTimer::new($cond, $crate::function_name!(), || ());
    };
    ($cond:expr, $label:expr $(,)?) => {
        let _scope_timer_guard =
            $crate::ConditionalScopeTimer::new($cond, $crate::function_name!(), || $label);
    };
}

// noop builds: arguments are type-checked in dead code and never evaluated.

#[cfg(feature = "noop")]
#[macro_export]
macro_rules! scope_timer {
    () => {};
    ($label:expr $(,)?) => {
        if false {
            let _ = &$label;
        }
    };
}

#[cfg(feature = "noop")]
#[macro_export]
macro_rules! scope_timer_if {
    ($cond:expr $(,)?) => {
        if false {
            let _ = &$cond;
        }
    };
    ($cond:expr, $label:expr $(,)?) => {
        if false {
            let _ = &$cond;
            let _ = &$label;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::__private::trim_function_name;

    #[test]
    fn test_trim_function_name() {
        assert_eq!(
            trim_function_name("app::run::__scope_timer_marker"),
            "app::run"
        );
        assert_eq!(
            trim_function_name("app::run::{{closure}}::{{closure}}::__scope_timer_marker"),
            "app::run"
        );
        assert_eq!(trim_function_name("odd"), "odd");
    }

    #[test]
    fn test_function_name_macro() {
        let name = crate::function_name!();
        assert_eq!(name, "scope_timer::tests::test_function_name_macro");
    }
}
