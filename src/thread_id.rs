//! Small per-thread identifiers for log lines.
//!
//! Each thread takes the next value of a shared counter the first time it
//! asks, then keeps it in thread-local storage. Ids start at 1, are never
//! handed out twice and never reused while the process lives. No locking.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

/// Next id to hand out. 0 marks "not assigned yet" in the thread-local slot.
static NEXT_ID: AtomicU32 = AtomicU32::new(1);

thread_local! {
    static THREAD_ID: Cell<u32> = const { Cell::new(0) };
}

/// Returns the calling thread's id, assigning one on first use.
///
/// # Examples
///
/// ```
/// # use scope_timer::thread_id::current_thread_id;
/// let id = current_thread_id();
/// assert!(id >= 1);
/// assert_eq!(id, current_thread_id());
///
/// let other = std::thread::spawn(current_thread_id).join().unwrap();
/// assert_ne!(id, other);
/// ```
pub fn current_thread_id() -> u32 {
    THREAD_ID
        .try_with(|slot| {
            let id = slot.get();
            if id != 0 {
                return id;
            }
            let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            slot.set(id);
            id
        })
        // thread-local already torn down: still hand out a unique id
        .unwrap_or_else(|_| NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
