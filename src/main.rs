use std::thread;
use std::time::Duration;

use scope_timer::{scope_timer, scope_timer_if, ScopeTimer};
use tracing_subscriber::EnvFilter;

fn busy_for(micros: u64) {
    thread::sleep(Duration::from_micros(micros));
}

fn simple_work() {
    scope_timer!("simpleWork");
    busy_for(2_500);
}

fn nested_scopes() {
    scope_timer!("nestedScopes:outer");
    busy_for(1_000);
    {
        scope_timer!("nestedScopes:inner 1");
        busy_for(1_500);
    }
    {
        scope_timer!("nestedScopes:inner 2");
        busy_for(2_500);
    }
    busy_for(500);
}

fn multiple_timers_same_scope() {
    scope_timer!("multi:first");
    busy_for(700);
    scope_timer!("multi:second");
    busy_for(800);
}

fn conditional_work(enabled: bool) {
    scope_timer_if!(enabled, "conditionalWork");
    busy_for(1_200);
}

fn looped_work(iterations: u32) {
    scope_timer!("loopedWork:total");
    for _ in 0..iterations {
        scope_timer!("loopedWork:iteration");
        busy_for(300);
    }
}

fn threaded_work(threads: u64) {
    scope_timer!("threadedWork:total");
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            thread::spawn(move || {
                scope_timer!("threadedWork:worker");
                busy_for(500 + i * 200);
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
}

struct Worker;

impl Worker {
    fn new() -> Self {
        scope_timer!("Worker:constructor");
        busy_for(500);
        Worker
    }

    fn do_task(&self, name: &str) {
        scope_timer!(name);
        busy_for(1_000);
    }

    fn do_multiple_tasks(&self, count: u32, timed: bool) {
        scope_timer_if!(timed, "Worker:doMultipleTasks");
        for i in 0..count {
            // built at runtime, so the timer keeps its own copy
            self.do_task_numbered(i);
        }
    }

    fn do_task_numbered(&self, i: u32) {
        scope_timer!(format!("Worker:task #{i}"));
        busy_for(1_000);
    }
}

/// Its timer field measures the whole lifetime of the object.
struct LifetimeTracked {
    _lifetime: ScopeTimer<'static>,
}

impl LifetimeTracked {
    fn new() -> Self {
        let tracked = Self {
            _lifetime: ScopeTimer::new("LifetimeTracked"),
        };
        busy_for(500);
        tracked
    }
}

impl Drop for LifetimeTracked {
    fn drop(&mut self) {
        busy_for(500);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    scope_timer!();

    simple_work();
    nested_scopes();
    multiple_timers_same_scope();
    conditional_work(false);
    conditional_work(true);
    looped_work(5);
    threaded_work(3);

    let worker = Worker::new();
    worker.do_task("Worker:singleTask");
    worker.do_multiple_tasks(3, true);
    worker.do_multiple_tasks(2, false);

    {
        let _tracked = LifetimeTracked::new();
        busy_for(1_500);
    }

    println!("timings appended to {}", scope_timer::sink::log_path().display());
}
