use std::cell::RefCell;
use std::fmt::Write;
use std::time::{Duration, Instant, SystemTime};

use crate::buffer::FixedBuf;
use crate::config;
use crate::elapsed;
use crate::label::{IntoLabel, Label};
use crate::sink;
use crate::thread_id::current_thread_id;
use crate::timestamp::{self, TimestampBuf};

/// Capacity of one formatted log line, terminator included.
pub const LINE_BUF_SIZE: usize = 512;

pub type LineBuf = FixedBuf<LINE_BUF_SIZE>;

const ELAPSED_BUF_SIZE: usize = 32;

/// Per-thread formatting space, reused by every timer dropped on the thread.
struct Scratch {
    end: TimestampBuf,
    elapsed: FixedBuf<ELAPSED_BUF_SIZE>,
    line: LineBuf,
}

impl Scratch {
    const fn new() -> Self {
        Self {
            end: FixedBuf::new(),
            elapsed: FixedBuf::new(),
            line: FixedBuf::new(),
        }
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = const { RefCell::new(Scratch::new()) };
}

/// State of a running timer. Absent when timing is switched off.
struct Running<'a> {
    location: &'a str,
    label: Label<'a>,
    thread_id: u32,
    start: Instant,
    start_text: TimestampBuf,
}

impl Running<'_> {
    /// Formats the line for this measurement into `scratch.line`.
    fn compose(&self, end_wall: SystemTime, elapsed_ns: u64, scratch: &mut Scratch) {
        scratch.end.clear();
        scratch.elapsed.clear();
        scratch.line.clear();

        timestamp::format_timestamp(end_wall, &mut scratch.end);
        elapsed::format_elapsed(elapsed_ns, &mut scratch.elapsed);

        let _ = writeln!(
            scratch.line,
            "[{}] TID={:03} | {} | start={} | end={} | elapsed={}",
            self.label.as_str(),
            self.thread_id,
            self.location,
            self.start_text.as_str(),
            scratch.end.as_str(),
            scratch.elapsed.as_str(),
        );
    }

    fn finish(&self) {
        let end = Instant::now();
        let end_wall = SystemTime::now();
        let elapsed_ns = duration_nanos(end.saturating_duration_since(self.start));

        let emit = |scratch: &mut Scratch| {
            self.compose(end_wall, elapsed_ns, scratch);
            sink::emit_line(scratch.line.as_bytes());
        };

        let done = SCRATCH
            .try_with(|cell| match cell.try_borrow_mut() {
                Ok(mut scratch) => {
                    emit(&mut *scratch);
                    true
                }
                Err(_) => false,
            })
            .unwrap_or(false);

        // thread is shutting down: fall back to a stack buffer
        if !done {
            emit(&mut Scratch::new());
        }
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Times the scope it lives in and logs one line when dropped.
///
/// Construction records the thread id and the start instants; dropping the
/// timer (normal exit, early `return`, `?`, or a panic unwinding through the
/// scope) computes the elapsed time and appends
///
/// ```text
/// [<label>] TID=<id> | <location> | start=<ts> | end=<ts> | elapsed=<value><unit>
/// ```
///
/// to the active sink. The timer is neither `Clone` nor `Copy`: one timer,
/// one measured scope. It is normally created through [`scope_timer!`], which
/// binds it to a hidden local so that several timers in one block coexist.
///
/// When `SCOPE_TIMER` disables timing, construction returns at once without
/// reading any clock, and dropping does nothing.
///
/// # Examples
///
/// ```
/// use scope_timer::ScopeTimer;
///
/// fn load() {
///     let _timer = ScopeTimer::with_label("load()", "startup");
///     // ... work ...
/// }
/// # load();
/// ```
///
/// A timer stored in a struct measures the lifetime of its owner:
///
/// ```
/// use scope_timer::ScopeTimer;
///
/// struct Session {
///     _lifetime: ScopeTimer<'static>,
/// }
///
/// let session = Session { _lifetime: ScopeTimer::new("Session") };
/// drop(session);
/// ```
///
/// [`scope_timer!`]: crate::scope_timer
#[must_use = "a timer measures nothing unless it is bound to a scope"]
pub struct ScopeTimer<'a> {
    running: Option<Running<'a>>,
}

impl<'a> ScopeTimer<'a> {
    /// Starts a timer with the default `ScopeTimer` label.
    pub fn new(location: &'a str) -> Self {
        Self::with_label(location, ())
    }

    /// Starts a timer with a label; see [`IntoLabel`] for which inputs are
    /// borrowed and which are copied.
    pub fn with_label<L>(location: &'a str, label: L) -> Self
    where
        L: IntoLabel<'a>,
    {
        if config::is_disabled() {
            return Self::disabled();
        }
        Self::start(location, label.into_label())
    }

    /// Like [`with_label`](Self::with_label), but builds the label only when
    /// timing is enabled.
    pub fn with_label_fn<F, L>(location: &'a str, make_label: F) -> Self
    where
        F: FnOnce() -> L,
        L: IntoLabel<'a>,
    {
        if config::is_disabled() {
            return Self::disabled();
        }
        Self::start(location, make_label().into_label())
    }

    fn disabled() -> Self {
        Self { running: None }
    }

    fn start(location: &'a str, label: Label<'a>) -> Self {
        let thread_id = current_thread_id();
        let start = Instant::now();
        let start_wall = SystemTime::now();
        // the start time is known now, format it outside the drop path
        let start_text = timestamp::timestamp_buf(start_wall);

        Self {
            running: Some(Running {
                location,
                label,
                thread_id,
                start,
                start_text,
            }),
        }
    }

    /// True when timing was switched off at construction.
    pub fn is_disabled(&self) -> bool {
        self.running.is_none()
    }

    pub fn label(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.label.as_str())
    }

    /// Whether the label text is a private copy held by this timer.
    pub fn owns_label(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| r.label.owns_storage())
    }

    pub fn location(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.location)
    }

    pub fn thread_id(&self) -> Option<u32> {
        self.running.as_ref().map(|r| r.thread_id)
    }

    /// Time since construction, zero for a disabled timer.
    pub fn elapsed(&self) -> Duration {
        self.running
            .as_ref()
            .map_or(Duration::ZERO, |r| r.start.elapsed())
    }
}

impl Drop for ScopeTimer<'_> {
    fn drop(&mut self) {
        if let Some(running) = self.running.as_ref() {
            running.finish();
        }
    }
}

/// A [`ScopeTimer`] behind a condition.
///
/// With a false condition no timer exists and the label closure is never
/// called. With a true one the inner timer spans the wrapper's scope.
/// Created through [`scope_timer_if!`](crate::scope_timer_if).
#[must_use = "a timer measures nothing unless it is bound to a scope"]
pub struct ConditionalScopeTimer<'a> {
    timer: Option<ScopeTimer<'a>>,
}

impl<'a> ConditionalScopeTimer<'a> {
    pub fn new<F, L>(enabled: bool, location: &'a str, make_label: F) -> Self
    where
        F: FnOnce() -> L,
        L: IntoLabel<'a>,
    {
        let timer = enabled.then(|| ScopeTimer::with_label_fn(location, make_label));
        Self { timer }
    }

    /// The inner timer, when the condition held.
    pub fn timer(&self) -> Option<&ScopeTimer<'a>> {
        self.timer.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_disabled())
    }
}
