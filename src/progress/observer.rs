//! Progress observers: where run events go.

use crate::progress::event::{ProgressEnvelope, RunEvent};
use crate::progress::now_millis;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info, warn};

/// Receives every event of every run on the runner it is attached to.
/// Called synchronously between items; keep it cheap.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

/// Writes run events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { run_id, total } => {
                info!(run_id = %run_id, total, "Batch run started");
            }
            RunEvent::ItemStarted {
                run_id,
                position,
                total,
                identifier,
            } => {
                debug!(run_id = %run_id, position, total, identifier = %identifier, "Item started");
            }
            RunEvent::ItemCompleted {
                run_id,
                position,
                identifier,
            } => {
                debug!(run_id = %run_id, position, identifier = %identifier, "Item completed");
            }
            RunEvent::ItemSkipped {
                run_id,
                position,
                identifier,
            } => {
                info!(run_id = %run_id, position, identifier = %identifier, "Item skipped: not enough content");
            }
            RunEvent::ItemErrored {
                run_id,
                position,
                identifier,
                error,
            } => {
                warn!(run_id = %run_id, position, identifier = %identifier, error = %error, "Item generation failed");
            }
            RunEvent::RunCompleted { run_id, summary } => {
                info!(
                    run_id = %run_id,
                    completed = summary.completed,
                    skipped = summary.skipped,
                    errored = summary.errored,
                    "Batch run completed"
                );
            }
        }
    }
}

/// In-process channel for progress events, e.g. to drive a UI on another thread.
pub struct ProgressBus {
    sender: Sender<ProgressEnvelope>,
    seq: AtomicU64,
}

impl ProgressBus {
    pub fn new_pair() -> (Self, Receiver<ProgressEnvelope>) {
        let (sender, receiver) = channel();
        (
            Self {
                sender,
                seq: AtomicU64::new(1),
            },
            receiver,
        )
    }
}

impl ProgressObserver for ProgressBus {
    fn on_event(&self, event: &RunEvent) {
        let envelope = ProgressEnvelope {
            ts: now_millis(),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            event: event.clone(),
        };
        if self.sender.send(envelope).is_err() {
            debug!(
                event_type = event.event_type(),
                "progress receiver dropped; event discarded"
            );
        }
    }
}

/// Adapts a closure into an observer.
pub struct CallbackObserver<F> {
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: Fn(&RunEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressObserver for CallbackObserver<F>
where
    F: Fn(&RunEvent) + Send + Sync,
{
    fn on_event(&self, event: &RunEvent) {
        (self.callback)(event)
    }
}
