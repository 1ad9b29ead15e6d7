//! Progress observability for batch runs.

pub mod event;
pub mod observer;

pub use event::{ProgressEnvelope, RunEvent, RunProgress};
pub use observer::{CallbackObserver, ProgressBus, ProgressObserver, TracingObserver};

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static RUN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Current time as milliseconds since Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generate a unique run id.
pub fn new_run_id() -> String {
    let ts = now_millis();
    let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("run-{ts}-{seq}")
}
