#![allow(dead_code)]

use parking_lot::{Mutex, MutexGuard};
use scope_timer::{set_sink, CaptureSink, TimerRecord};

/// Tests in one binary share the process-wide sink, so they take turns.
static SINK_LOCK: Mutex<()> = Mutex::new(());

pub struct Captured {
    pub sink: CaptureSink,
    _guard: MutexGuard<'static, ()>,
}

impl Captured {
    pub fn records(&self) -> Vec<TimerRecord> {
        scope_timer::LogReader::new(&self.sink.contents()).collect()
    }

    pub fn with_label(&self, label: &str) -> Vec<TimerRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.label == label)
            .collect()
    }
}

/// Holds the shared sink for the duration of a test.
pub fn serial() -> MutexGuard<'static, ()> {
    SINK_LOCK.lock()
}

/// Routes timer output into memory for the duration of a test.
pub fn capture() -> Captured {
    let guard = serial();
    let sink = CaptureSink::new();
    set_sink(Box::new(sink.clone()));
    Captured {
        sink,
        _guard: guard,
    }
}
