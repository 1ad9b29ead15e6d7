//! Batch runner: generates items one at a time, isolating per-item failure.
//!
//! Items are processed strictly in order with a single generation call in
//! flight. That bounds load on the backend and keeps progress exact. A
//! failing or panicking call is recorded on its item and the run moves on;
//! only the pre-run checks can fail the whole run.

use crate::batch::item::BatchItem;
use crate::batch::report::preflight;
use crate::batch::result::{BatchResult, BatchRun, ResultStatus};
use crate::error::{BatchError, GenerationError};
use crate::generation::{GenerationResponse, GenerationService};
use crate::privacy::IdentifierPolicy;
use crate::progress::{new_run_id, ProgressObserver, RunEvent, RunProgress};
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives batch runs. Owns no run state between runs; each `run` returns an
/// owned `BatchRun`. One run at a time per runner.
pub struct BatchRunner {
    observers: Vec<Arc<dyn ProgressObserver>>,
    identifier_policy: IdentifierPolicy,
    in_flight: AtomicBool,
    progress: Mutex<RunProgress>,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            identifier_policy: IdentifierPolicy::Permissive,
            in_flight: AtomicBool::new(false),
            progress: Mutex::new(RunProgress::idle()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// Live position of the current run, idle when none is in flight.
    pub fn progress(&self) -> RunProgress {
        *self.progress.lock()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run `generate` over every valid item, in order.
    ///
    /// `is_valid` is evaluated once per item, before the first generation
    /// call; that one verdict decides both the `NoValidInput` check and
    /// whether the item is generated or skipped.
    ///
    /// Fails before any generation call with `RunInProgress`,
    /// `IdentifierRejected` or `NoValidInput`. Otherwise always returns a run
    /// with exactly one result per item.
    pub async fn run<P, V, G, Fut>(
        &self,
        items: Vec<BatchItem<P>>,
        is_valid: V,
        mut generate: G,
    ) -> Result<BatchRun<P>, BatchError>
    where
        V: Fn(&BatchItem<P>) -> bool,
        G: FnMut(&BatchItem<P>) -> Fut,
        Fut: Future<Output = Result<String, GenerationError>>,
    {
        let _guard = self.acquire()?;

        let report = preflight(&items, &is_valid, self.identifier_policy);
        if self.identifier_policy == IdentifierPolicy::Strict {
            if let Some((identifier, reason)) = report.first_identifier_issue() {
                warn!(identifier = %identifier, reason = %reason, "Batch rejected by identifier policy");
                return Err(BatchError::IdentifierRejected {
                    identifier: identifier.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        if report.valid_count() == 0 {
            warn!(items = items.len(), "Batch has no item with enough content");
            return Err(BatchError::NoValidInput);
        }

        let mut run = BatchRun::start(new_run_id(), items);
        let run_id = run.run_id().to_string();
        let total = run.len();
        self.emit(&RunEvent::RunStarted {
            run_id: run_id.clone(),
            total,
        });

        for index in 0..total {
            let position = run.advance();
            *self.progress.lock() = RunProgress {
                cursor: position,
                total,
            };

            let item = &run.items()[index];
            let identifier = item.identifier.clone();
            self.emit(&RunEvent::ItemStarted {
                run_id: run_id.clone(),
                position,
                total,
                identifier: identifier.clone(),
            });

            let result = if !report.entries[index].will_generate {
                BatchResult::skipped(identifier.clone())
            } else {
                match generate_contained(&mut generate, item).await {
                    Ok(text) => BatchResult::completed(identifier.clone(), text),
                    Err(err) => BatchResult::errored(identifier.clone(), &err),
                }
            };

            let event = match result.status() {
                ResultStatus::Completed => RunEvent::ItemCompleted {
                    run_id: run_id.clone(),
                    position,
                    identifier,
                },
                ResultStatus::Skipped => RunEvent::ItemSkipped {
                    run_id: run_id.clone(),
                    position,
                    identifier,
                },
                ResultStatus::Errored => RunEvent::ItemErrored {
                    run_id: run_id.clone(),
                    position,
                    identifier,
                    error: result.content().to_string(),
                },
            };
            run.push(result);
            self.emit(&event);
        }

        run.finish();
        self.emit(&RunEvent::RunCompleted {
            run_id,
            summary: run.summary(),
        });
        Ok(run)
    }

    /// `run` against a `GenerationService`: `build_request` turns each valid
    /// item into the service's JSON request, and an `{ "error": ... }` reply
    /// counts as that item's failure.
    pub async fn run_with_service<P, V, S, B>(
        &self,
        items: Vec<BatchItem<P>>,
        is_valid: V,
        service: &S,
        build_request: B,
    ) -> Result<BatchRun<P>, BatchError>
    where
        V: Fn(&BatchItem<P>) -> bool,
        S: GenerationService + ?Sized,
        B: Fn(&BatchItem<P>) -> Value,
    {
        debug!(service = service.service_name(), "Running batch against generation service");
        self.run(items, is_valid, move |item| {
            let request = build_request(item);
            async move {
                service
                    .generate(request)
                    .await
                    .and_then(GenerationResponse::into_content)
            }
        })
        .await
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, BatchError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BatchError::RunInProgress)?;
        Ok(InFlightGuard { runner: self })
    }

    fn emit(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Clears the in-flight flag and live progress, including when a run future
/// is dropped part-way.
struct InFlightGuard<'a> {
    runner: &'a BatchRunner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *self.runner.progress.lock() = RunProgress::idle();
        self.runner.in_flight.store(false, Ordering::Release);
    }
}

async fn generate_contained<P, G, Fut>(
    generate: &mut G,
    item: &BatchItem<P>,
) -> Result<String, GenerationError>
where
    G: FnMut(&BatchItem<P>) -> Fut,
    Fut: Future<Output = Result<String, GenerationError>>,
{
    match AssertUnwindSafe(async { generate(item).await })
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(panic) => Err(GenerationError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
