//! Destination of formatted timer lines.
//!
//! A [`LogSink`] takes complete lines and an occasional flush request. The
//! process-wide [`SinkState`] owns the default [`FileSink`], an optional
//! replacement installed with [`set_sink`], and the line counter that drives
//! the periodic flush. Everything here swallows its errors: a timing utility
//! must never disturb the program it measures.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use lazy_static::lazy_static;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::{self, LOG_FILE_NAME};
use crate::error::{Result, ScopeTimerError};

/// Receiver of formatted timer lines.
///
/// Implementations must not panic; failures are dropped silently. Calls are
/// serialized by the process-wide lock, so `&mut self` access is exclusive.
/// A sink must not create timers itself: the nested emit would wait on the
/// lock it is already holding.
///
/// # Usage
///
/// ```
/// # use scope_timer::LogSink;
/// struct StderrSink;
///
/// impl LogSink for StderrSink {
///     fn write(&mut self, line: &[u8]) {
///         use std::io::Write;
///         let _ = std::io::stderr().write_all(line);
///     }
///
///     fn flush(&mut self) {}
/// }
/// ```
pub trait LogSink: Send {
    /// Appends one line. `line` carries its own length and may contain any bytes.
    fn write(&mut self, line: &[u8]);

    /// Pushes buffered data to stable storage.
    fn flush(&mut self);

    /// Releases underlying resources. Called when the sink is swapped out and at exit.
    fn close(&mut self) {
        self.flush();
    }
}

/// Default sink: appends to `<dir>/ScopeTimer.log`.
///
/// The file is opened lazily on the first non-empty write, in append mode and
/// close-on-exec (the standard library sets `O_CLOEXEC` on every open), and
/// then reused. When opening fails the failed path is remembered and later
/// writes against the same path return immediately; a different path is
/// tried again.
#[derive(Debug, Default)]
pub struct FileSink {
    dir: Option<PathBuf>,
    file: Option<File>,
    last_failed: Option<PathBuf>,
}

impl FileSink {
    /// A sink whose directory comes from the process configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink writing into `dir`, ignoring `SCOPE_TIMER_DIR`.
    pub fn with_directory(dir: impl AsRef<Path>) -> Self {
        let mut sink = Self::new();
        sink.set_directory(Some(dir.as_ref()));
        sink
    }

    /// Directory in use, ending with `/`. Resolved once and cached.
    pub fn log_directory(&mut self) -> &Path {
        self.dir
            .get_or_insert_with(|| config::global().log_dir.clone())
            .as_path()
    }

    /// Overrides the directory, or with `None` re-reads `SCOPE_TIMER_DIR`
    /// (falling back to `/tmp`). Any open file is closed so the next write
    /// goes to the new location.
    pub fn set_directory(&mut self, dir: Option<&Path>) {
        let resolved = match dir {
            Some(dir) => config::resolve_log_dir(Some(dir.as_os_str())),
            None => config::resolve_log_dir(env::var_os(config::ENV_DIR).as_deref()),
        };
        trace!(dir = %resolved.display(), "log directory set");
        self.close_file();
        self.dir = Some(resolved);
    }

    /// Full path of the log file.
    pub fn log_path(&mut self) -> PathBuf {
        self.log_directory().join(LOG_FILE_NAME)
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the last failed open, while it is being skipped.
    pub fn last_failed_path(&self) -> Option<&Path> {
        self.last_failed.as_deref()
    }

    /// Opens the log file if needed. Returns `false` when no file is available.
    pub fn ensure_open(&mut self) -> bool {
        if self.file.is_some() {
            return true;
        }

        let path = self.log_path();
        if self.last_failed.as_deref() == Some(path.as_path()) {
            return false;
        }

        match open_append(&path) {
            Ok(file) => {
                debug!(path = %path.display(), "opened timer log");
                self.file = Some(file);
                self.last_failed = None;
                register_exit_hook();
                true
            }
            Err(e) => {
                debug!(error = %e, "timer log unavailable, lines will be dropped");
                self.last_failed = Some(path);
                false
            }
        }
    }

    fn close_file(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_data();
        }
    }
}

impl LogSink for FileSink {
    fn write(&mut self, line: &[u8]) {
        if line.is_empty() || !self.ensure_open() {
            return;
        }
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(line);
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_ref() {
            let _ = file.sync_data();
        }
    }

    fn close(&mut self) {
        self.close_file();
    }
}

fn open_append(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path).map_err(|source| ScopeTimerError::OpenLog {
        path: path.to_path_buf(),
        source,
    })
}

/// In-memory sink, mainly for tests. Clones share the same storage.
///
/// ```
/// # use scope_timer::{CaptureSink, LogSink};
/// let capture = CaptureSink::new();
/// let mut sink = capture.clone();
/// sink.write(b"one\n");
/// sink.write(b"two\n");
/// sink.flush();
/// assert_eq!(capture.lines(), vec!["one", "two"]);
/// assert_eq!(capture.flush_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    data: Arc<Mutex<Vec<u8>>>,
    writes: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    /// Written lines without their trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.data.lock().clear();
        self.writes.store(0, Ordering::SeqCst);
        self.flushes.store(0, Ordering::SeqCst);
    }
}

impl LogSink for CaptureSink {
    fn write(&mut self, line: &[u8]) {
        self.data.lock().extend_from_slice(line);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn flush(&mut self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink built from a write closure and an optional flush closure.
pub struct FnSink<W> {
    write: W,
    flush: Option<Box<dyn FnMut() + Send>>,
}

impl<W> FnSink<W>
where
    W: FnMut(&[u8]) + Send,
{
    pub fn new(write: W) -> Self {
        Self { write, flush: None }
    }

    pub fn with_flush(mut self, flush: impl FnMut() + Send + 'static) -> Self {
        self.flush = Some(Box::new(flush));
        self
    }
}

impl<W> LogSink for FnSink<W>
where
    W: FnMut(&[u8]) + Send,
{
    fn write(&mut self, line: &[u8]) {
        (self.write)(line);
    }

    fn flush(&mut self) {
        if let Some(flush) = self.flush.as_mut() {
            flush();
        }
    }
}

/// Process-wide sink state: the default file sink, an optional replacement,
/// and the line counter driving periodic flushes.
pub struct SinkState {
    default: FileSink,
    custom: Option<Box<dyn LogSink>>,
    lines: u64,
    flush_interval: u64,
}

impl SinkState {
    pub fn new(default: FileSink, flush_interval: u32) -> Self {
        Self {
            default,
            custom: None,
            lines: 0,
            flush_interval: u64::from(flush_interval.max(1)),
        }
    }

    fn active(&mut self) -> &mut dyn LogSink {
        match self.custom.as_mut() {
            Some(sink) => sink.as_mut(),
            None => &mut self.default,
        }
    }

    /// Writes one line and flushes on every `flush_interval`-th line.
    pub fn emit(&mut self, line: &[u8]) {
        if !line.is_empty() {
            self.active().write(line);
        }
        self.lines += 1;
        if self.lines % self.flush_interval == 0 {
            self.active().flush();
        }
    }

    /// Lines emitted since the process started.
    pub fn lines_emitted(&self) -> u64 {
        self.lines
    }

    /// Installs `sink` in place of the current one. The default file is
    /// closed first so the two never write to the same target.
    pub fn replace(&mut self, sink: Box<dyn LogSink>) {
        self.default.close();
        if let Some(mut previous) = self.custom.replace(sink) {
            previous.close();
        }
    }

    /// Goes back to the default file sink.
    pub fn restore_default(&mut self) {
        self.default.close();
        if let Some(mut previous) = self.custom.take() {
            previous.close();
        }
    }

    pub fn file_sink(&mut self) -> &mut FileSink {
        &mut self.default
    }

    fn shutdown(&mut self) {
        if let Some(sink) = self.custom.as_mut() {
            sink.flush();
        }
        self.default.close();
    }
}

lazy_static! {
    static ref SINK: Mutex<SinkState> =
        Mutex::new(SinkState::new(FileSink::new(), config::flush_interval()));
}

static EXIT_HOOK: Once = Once::new();

extern "C" fn flush_at_exit() {
    // Another thread may still hold the lock while the process exits.
    if let Some(mut state) = SINK.try_lock() {
        state.shutdown();
    }
}

fn register_exit_hook() {
    EXIT_HOOK.call_once(|| {
        // SAFETY: flush_at_exit is a plain extern "C" fn that never unwinds.
        let rc = unsafe { libc::atexit(flush_at_exit) };
        if rc != 0 {
            debug!("could not register timer log exit hook");
        }
    });
}

/// Hands a finished line to the active sink under the process-wide lock.
pub fn emit_line(line: &[u8]) {
    SINK.lock().emit(line);
}

/// Replaces the process-wide sink, closing the default log file.
pub fn set_sink(sink: Box<dyn LogSink>) {
    debug!("installing custom timer sink");
    SINK.lock().replace(sink);
}

/// Restores the default file sink.
pub fn reset_sink() {
    debug!("restoring default timer sink");
    SINK.lock().restore_default();
}

/// Overrides the log directory of the default sink; `None` re-reads
/// `SCOPE_TIMER_DIR`.
pub fn set_log_directory(dir: Option<&Path>) {
    SINK.lock().file_sink().set_directory(dir);
}

/// Path the default sink writes to.
pub fn log_path() -> PathBuf {
    SINK.lock().file_sink().log_path()
}

/// Flushes the active sink now.
pub fn flush() {
    SINK.lock().active().flush();
}

/// Lines emitted so far by this process.
pub fn lines_emitted() -> u64 {
    SINK.lock().lines_emitted()
}
