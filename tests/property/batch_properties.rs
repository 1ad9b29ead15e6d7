//! Property-based tests for BatchRunner and export assembly

use classgen::batch::{BatchItem, BatchRun, BatchRunner, ResultStatus, SKIPPED_PLACEHOLDER};
use classgen::error::GenerationError;
use classgen::export::{assemble, SECTION_SEPARATOR};
use classgen::progress::{CallbackObserver, RunEvent};
use futures::executor::block_on;
use futures::future::{ready, Ready};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

/// One generated item: whether it passes validation and whether its
/// generation call fails.
#[derive(Debug, Clone)]
struct Case {
    valid: bool,
    fails: bool,
}

fn cases() -> impl Strategy<Value = Vec<Case>> {
    prop::collection::vec(
        (any::<bool>(), prop::bool::weighted(0.3)).prop_map(|(valid, fails)| Case { valid, fails }),
        1..24,
    )
}

fn items_for(cases: &[Case]) -> Vec<BatchItem<Case>> {
    cases
        .iter()
        .enumerate()
        .map(|(i, case)| BatchItem::new(format!("Student {}", i + 1), case.clone()))
        .collect()
}

fn generate(item: &BatchItem<Case>) -> Ready<Result<String, GenerationError>> {
    if item.payload.fails {
        ready(Err(GenerationError::Service(format!(
            "failed {}",
            item.identifier
        ))))
    } else {
        ready(Ok(format!("text for {}", item.identifier)))
    }
}

fn run_cases(cases: &[Case]) -> BatchRun<Case> {
    block_on(BatchRunner::new().run(items_for(cases), |item| item.payload.valid, generate)).unwrap()
}

/// Every input item yields exactly one result, in input order.
#[test]
fn test_run_completeness_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&cases(), |cases| {
            prop_assume!(cases.iter().any(|c| c.valid));
            let run = run_cases(&cases);

            prop_assert_eq!(run.len(), cases.len());
            prop_assert_eq!(run.results().len(), cases.len());
            for (i, result) in run.results().iter().enumerate() {
                prop_assert_eq!(result.identifier(), format!("Student {}", i + 1));
                let expected = match (cases[i].valid, cases[i].fails) {
                    (false, _) => ResultStatus::Skipped,
                    (true, true) => ResultStatus::Errored,
                    (true, false) => ResultStatus::Completed,
                };
                prop_assert_eq!(result.status(), expected);
            }
            Ok(())
        })
        .unwrap();
}

/// A failing item changes nothing about any other item's result.
#[test]
fn test_failure_isolation_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&cases(), |cases| {
            prop_assume!(cases.iter().any(|c| c.valid));
            let with_failures = run_cases(&cases);
            let no_failures: Vec<Case> = cases
                .iter()
                .map(|c| Case {
                    valid: c.valid,
                    fails: false,
                })
                .collect();
            let clean = run_cases(&no_failures);

            for (i, case) in cases.iter().enumerate() {
                if !case.fails {
                    prop_assert_eq!(&with_failures.results()[i], &clean.results()[i]);
                }
            }
            Ok(())
        })
        .unwrap();
}

/// Progress positions run 1..=N, each announced before its result exists.
#[test]
fn test_progress_monotonicity_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&cases(), |cases| {
            prop_assume!(cases.iter().any(|c| c.valid));
            let log = Arc::new(Mutex::new(Vec::new()));
            let events = Arc::clone(&log);
            let batch_runner = BatchRunner::new().with_observer(Arc::new(CallbackObserver::new(
                move |event: &RunEvent| match event {
                    RunEvent::ItemStarted { position, .. } => events.lock().push((*position, true)),
                    RunEvent::ItemCompleted { position, .. }
                    | RunEvent::ItemSkipped { position, .. }
                    | RunEvent::ItemErrored { position, .. } => {
                        events.lock().push((*position, false))
                    }
                    _ => {}
                },
            )));

            block_on(batch_runner.run(items_for(&cases), |item| item.payload.valid, generate))
                .unwrap();

            let log = log.lock();
            let expected: Vec<(usize, bool)> = (1..=cases.len())
                .flat_map(|position| [(position, true), (position, false)])
                .collect();
            prop_assert_eq!(&*log, &expected);
            prop_assert!(batch_runner.progress().is_idle());
            Ok(())
        })
        .unwrap();
}

/// Assembly holds exactly the completed results' export text, in order.
#[test]
fn test_export_exclusion_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(cases(), prop::collection::vec(any::<bool>(), 24)),
            |(cases, edits)| {
                prop_assume!(cases.iter().any(|c| c.valid));
                let mut run = run_cases(&cases);
                for (i, edit) in edits.iter().take(cases.len()).enumerate() {
                    if *edit {
                        run.edit(i, format!("edited {}", i)).unwrap();
                    }
                }

                let text = assemble(&run, "");

                prop_assert!(!text.contains(SKIPPED_PLACEHOLDER));
                prop_assert!(!text.contains("Error generating"));
                let expected: String = run
                    .results()
                    .iter()
                    .filter(|r| r.status() == ResultStatus::Completed)
                    .map(|r| {
                        format!(
                            "--- {} ---\n{}\n\n{}\n\n",
                            r.identifier(),
                            r.export_text(),
                            SECTION_SEPARATOR
                        )
                    })
                    .collect();
                prop_assert_eq!(text, expected);
                Ok(())
            },
        )
        .unwrap();
}
