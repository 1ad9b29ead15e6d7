//! Integration tests for export assembly and the export hand-off

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use classgen::batch::{BatchItem, BatchRun, BatchRunner, SKIPPED_PLACEHOLDER};
use classgen::error::{ExportError, GenerationError};
use classgen::export::{
    assemble, export_run, ExportDocument, ExportHeader, ExportRequest, ExportService,
    SECTION_SEPARATOR,
};
use classgen::privacy::{contains_placeholder, PLACEHOLDER_TOKEN};
use futures::future::{ready, Ready};
use parking_lot::Mutex;

fn reply(item: &BatchItem<&str>) -> Ready<Result<String, GenerationError>> {
    match item.payload {
        "fail" => ready(Err(GenerationError::Service("model overloaded".to_string()))),
        text => ready(Ok(format!("Feedback for {}: {}", PLACEHOLDER_TOKEN, text))),
    }
}

async fn mixed_run() -> BatchRun<&'static str> {
    let items = vec![
        BatchItem::new("Student 1", "clear thesis"),
        BatchItem::new("Student 2", ""),
        BatchItem::new("Student 3", "fail"),
        BatchItem::new("Student 4", "good evidence"),
    ];
    BatchRunner::new()
        .run(items, |item| !item.payload.is_empty(), reply)
        .await
        .unwrap()
}

#[tokio::test]
async fn assembly_holds_completed_sections_only_in_order() {
    let mut run = mixed_run().await;
    run.edit(3, "Edited feedback for Student 4").unwrap();

    let text = assemble(&run, "Essay Feedback");

    let expected = format!(
        "Essay Feedback\n\n\
         --- Student 1 ---\nFeedback for [Student Name]: clear thesis\n\n{sep}\n\n\
         --- Student 4 ---\nEdited feedback for Student 4\n\n{sep}\n\n",
        sep = SECTION_SEPARATOR
    );
    assert_eq!(text, expected);
    assert!(!text.contains(SKIPPED_PLACEHOLDER));
    assert!(!text.contains("Error generating"));
    assert!(!text.contains("Student 2"));
    assert!(!text.contains("Student 3"));
    // the placeholder is left for the reader to fill in
    assert!(contains_placeholder(&text));
}

#[tokio::test]
async fn header_renders_metadata_block() {
    let run = mixed_run().await;
    let header = ExportHeader::new("Essay Feedback", "feedback")
        .with_generated_at(Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap())
        .with_setting("Grade", "7");

    let text = assemble(&run, &header.render());
    assert!(text.starts_with(
        "Essay Feedback\nTool: feedback\nGenerated: 2026-03-02 09:05 UTC\nGrade: 7\n\n--- Student 1 ---"
    ));
}

struct RecordingExport {
    requests: Mutex<Vec<ExportRequest>>,
    outcome: Result<ExportDocument, ExportError>,
}

#[async_trait]
impl ExportService for RecordingExport {
    async fn export(&self, request: &ExportRequest) -> Result<ExportDocument, ExportError> {
        self.requests.lock().push(request.clone());
        self.outcome.clone()
    }
}

#[tokio::test]
async fn export_sends_assembled_content_with_tool_name() {
    let run = mixed_run().await;
    let service = RecordingExport {
        requests: Mutex::new(Vec::new()),
        outcome: Ok(ExportDocument {
            bytes: b"PK\x03\x04docx".to_vec(),
            content_type: Some("application/octet-stream".to_string()),
            file_name: Some("feedback.docx".to_string()),
        }),
    };
    let header = ExportHeader::new("Essay Feedback", "feedback");

    let document = export_run(&service, &run, &header).await.unwrap();

    assert_eq!(document.file_name.as_deref(), Some("feedback.docx"));
    let requests = service.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].title, "Essay Feedback");
    assert_eq!(requests[0].tool_name, "feedback");
    assert_eq!(requests[0].content, assemble(&run, &header.render()));
}

#[tokio::test]
async fn failed_export_leaves_results_untouched() {
    let run = mixed_run().await;
    let before: Vec<_> = run.results().to_vec();
    let service = RecordingExport {
        requests: Mutex::new(Vec::new()),
        outcome: Err(ExportError::Timeout("export service slow".to_string())),
    };

    let err = export_run(&service, &run, &ExportHeader::new("T", "feedback"))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(run.results(), before.as_slice());
}

#[tokio::test]
async fn run_without_completed_results_is_not_exported() {
    let run = BatchRunner::new()
        .run(
            vec![BatchItem::new("Student 1", "fail"), BatchItem::new("Student 2", "")],
            |item| !item.payload.is_empty(),
            reply,
        )
        .await
        .unwrap();
    let service = RecordingExport {
        requests: Mutex::new(Vec::new()),
        outcome: Err(ExportError::Failed("unused".to_string())),
    };

    let err = export_run(&service, &run, &ExportHeader::new("T", "feedback"))
        .await
        .unwrap_err();

    assert_eq!(err, ExportError::NothingToExport);
    assert!(service.requests.lock().is_empty());
    assert_eq!(assemble(&run, ""), "");
}
