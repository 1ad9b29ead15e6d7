//! Integration tests for BatchRunner: completeness, isolation, gating, progress

use async_trait::async_trait;
use classgen::batch::{json_text_at_least, BatchItem, BatchRunner, ResultStatus};
use classgen::error::{BatchError, GenerationError};
use classgen::generation::{GenerationResponse, GenerationService};
use classgen::progress::{CallbackObserver, ProgressBus, RunEvent};
use futures::future::{ready, Ready};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

const LONG_ESSAY: &str =
    "a sufficiently long valid essay about the water cycle and why clouds form over oceans";

fn ok(text: &str) -> Ready<Result<String, GenerationError>> {
    ready(Ok(text.to_string()))
}

fn fail(error: GenerationError) -> Ready<Result<String, GenerationError>> {
    ready(Err(error))
}

fn seed_items() -> Vec<BatchItem<Value>> {
    vec![
        BatchItem::new("A", json!({ "text": "short" })),
        BatchItem::new("B", json!({ "text": LONG_ESSAY })),
        BatchItem::new("C", json!({ "text": "" })),
    ]
}

/// Replies from a fixed script and records every request it receives.
struct ScriptedService {
    replies: Mutex<Vec<Result<GenerationResponse, GenerationError>>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedService {
    fn new(mut replies: Vec<Result<GenerationResponse, GenerationError>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(&self, request: Value) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop()
            .unwrap_or_else(|| Err(GenerationError::Service("script exhausted".to_string())))
    }

    fn service_name(&self) -> &str {
        "scripted"
    }
}

#[tokio::test]
async fn seed_scenario_generates_only_the_long_item() {
    let service = ScriptedService::new(vec![Ok(GenerationResponse::with_content(
        "Strong structure.",
    ))]);
    let runner = BatchRunner::new();

    let run = runner
        .run_with_service(
            seed_items(),
            json_text_at_least(50, Some("text".to_string())),
            &service,
            |item| item.payload.clone(),
        )
        .await
        .unwrap();

    let statuses: Vec<_> = run.results().iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ResultStatus::Skipped,
            ResultStatus::Completed,
            ResultStatus::Skipped
        ]
    );
    assert_eq!(run.results()[1].content(), "Strong structure.");
    assert_eq!(service.requests.lock().len(), 1);
    assert_eq!(service.requests.lock()[0]["text"], LONG_ESSAY);
}

#[tokio::test]
async fn seed_scenario_error_payload_marks_item_errored() {
    let service = ScriptedService::new(vec![Ok(GenerationResponse::with_error("rate limited"))]);
    let run = BatchRunner::new()
        .run_with_service(
            seed_items(),
            json_text_at_least(50, Some("text".to_string())),
            &service,
            |item| item.payload.clone(),
        )
        .await
        .unwrap();

    let b = &run.results()[1];
    assert_eq!(b.status(), ResultStatus::Errored);
    assert!(b.content().contains("rate limited"));
    assert_eq!(run.summary().skipped, 2);
}

#[tokio::test]
async fn middle_failure_does_not_block_the_run() {
    let items: Vec<BatchItem<&str>> = vec![
        BatchItem::new("Student 1", "one"),
        BatchItem::new("Student 2", "two"),
        BatchItem::new("Student 3", "three"),
    ];
    let run = BatchRunner::new()
        .run(
            items,
            |_| true,
            |item| {
                if item.identifier == "Student 2" {
                    fail(GenerationError::Transport("connection reset".to_string()))
                } else {
                    ok(&format!("feedback for {}", item.payload))
                }
            },
        )
        .await
        .unwrap();

    assert_eq!(run.len(), 3);
    let statuses: Vec<_> = run.results().iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ResultStatus::Completed,
            ResultStatus::Errored,
            ResultStatus::Completed
        ]
    );
    assert_eq!(run.results()[0].content(), "feedback for one");
    assert_eq!(run.results()[2].content(), "feedback for three");
    assert!(run.results()[1].content().contains("connection reset"));
}

#[tokio::test]
async fn invalid_items_never_reach_the_generator() {
    let calls = Mutex::new(Vec::new());
    let items = vec![
        BatchItem::new("Student 1", ""),
        BatchItem::new("Student 2", "body"),
        BatchItem::new("Student 3", " "),
    ];
    let run = BatchRunner::new()
        .run(
            items,
            |item| !item.payload.trim().is_empty(),
            |item| {
                calls.lock().push(item.identifier.clone());
                ok("done")
            },
        )
        .await
        .unwrap();

    assert_eq!(*calls.lock(), vec!["Student 2".to_string()]);
    assert_eq!(run.summary().skipped, 2);
}

#[tokio::test]
async fn all_invalid_input_is_rejected_before_any_call() {
    let calls = Mutex::new(0usize);
    let result = BatchRunner::new()
        .run(
            vec![BatchItem::new("Student 1", ""), BatchItem::new("Student 2", "")],
            |item| !item.payload.is_empty(),
            |_| {
                *calls.lock() += 1;
                ok("never")
            },
        )
        .await;

    assert!(matches!(result, Err(BatchError::NoValidInput)));
    assert_eq!(*calls.lock(), 0);
}

#[tokio::test]
async fn progress_is_strictly_increasing_and_precedes_each_result() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::clone(&log);
    let runner = BatchRunner::new().with_observer(Arc::new(CallbackObserver::new(
        move |event: &RunEvent| match event {
            RunEvent::ItemStarted { position, .. } => events.lock().push(format!("start {}", position)),
            RunEvent::ItemCompleted { position, .. }
            | RunEvent::ItemSkipped { position, .. }
            | RunEvent::ItemErrored { position, .. } => {
                events.lock().push(format!("done {}", position))
            }
            _ => {}
        },
    )));

    let items = vec![
        BatchItem::new("Student 1", "x"),
        BatchItem::new("Student 2", ""),
        BatchItem::new("Student 3", "y"),
        BatchItem::new("Student 4", "z"),
    ];
    let run = runner
        .run(items, |item| !item.payload.is_empty(), |_| ok("text"))
        .await
        .unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "start 1", "done 1", "start 2", "done 2", "start 3", "done 3", "start 4", "done 4"
        ]
    );
    assert_eq!(run.cursor(), 4);
    assert!(runner.progress().is_idle());
}

#[tokio::test]
async fn progress_bus_delivers_sequenced_envelopes() {
    let (bus, receiver) = ProgressBus::new_pair();
    let runner = BatchRunner::new().with_observer(Arc::new(bus));

    runner
        .run(
            vec![BatchItem::new("Student 1", "x"), BatchItem::new("Student 2", "y")],
            |_| true,
            |_| ok("text"),
        )
        .await
        .unwrap();
    drop(runner);

    let mut kinds = Vec::new();
    let mut last_seq = None;
    while let Ok(envelope) = receiver.try_recv() {
        if let Some(prev) = last_seq {
            assert!(envelope.seq > prev);
        }
        last_seq = Some(envelope.seq);
        kinds.push(envelope.event.event_type());
    }
    assert_eq!(
        kinds,
        vec![
            "run_started",
            "item_started",
            "item_completed",
            "item_started",
            "item_completed",
            "run_completed"
        ]
    );
}

#[tokio::test]
async fn edits_after_the_run_touch_only_their_own_result() {
    let items = vec![BatchItem::new("Student 1", "x"), BatchItem::new("Student 2", "y")];
    let mut run = BatchRunner::new()
        .run(items, |_| true, |item| ok(&format!("draft {}", item.payload)))
        .await
        .unwrap();
    let before = run.results()[1].clone();

    run.edit(0, "rewritten by hand").unwrap();

    assert_eq!(run.results()[0].content(), "draft x");
    assert_eq!(run.results()[0].edited_content(), "rewritten by hand");
    assert_eq!(run.results()[1], before);
    assert!(matches!(
        run.edit(5, "nope"),
        Err(BatchError::ResultIndexOutOfRange { index: 5, len: 2 })
    ));
}

#[tokio::test]
async fn runner_is_reusable_after_a_run() {
    let runner = BatchRunner::new();
    let first = runner
        .run(vec![BatchItem::new("Student 1", "x")], |_| true, |_| ok("one"))
        .await
        .unwrap();
    let second = runner
        .run(
            vec![BatchItem::new("Student 1", "x"), BatchItem::new("Student 2", "y")],
            |_| true,
            |_| ok("two"),
        )
        .await
        .unwrap();

    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(second.len(), 2);
    assert_eq!(second.results()[0].content(), "two");
    assert!(!runner.is_running());
}
