//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::batch::{json_text_at_least, preflight, BatchItem, BatchRun, BatchRunner};
use crate::cli::command_name;
use crate::cli::parse::{Commands, RunArgs};
use crate::cli::presentation::{
    format_preflight_json, format_preflight_text, format_run_json, format_run_review_text,
};
use crate::config::{ClassgenConfig, ConfigLoader};
use crate::error::ApiError;
use crate::export::{assemble, export_run, ExportHeader, HttpExportService};
use crate::extract::{extract_file, ExtractorChain, HttpTextExtractor, TextExtractor};
use crate::generation::HttpGenerationService;
use crate::progress::{ProgressObserver, RunEvent, TracingObserver};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const REDACTED: &str = "********";

/// Runtime context for CLI execution: workspace root and effective config.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ClassgenConfig,
    quiet: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.ensure_valid()?;
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: ClassgenConfig) -> Self {
        Self {
            workspace_root,
            config,
            quiet: false,
        }
    }

    /// Suppress terminal progress lines during `run`.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn config(&self) -> &ClassgenConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = name, "Command started");
        let result = self.execute_inner(command);
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(command = name, duration_ms, "Command finished"),
            Err(e) => warn!(command = name, duration_ms, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Run(args) => self.handle_run(args),
            Commands::Assemble {
                run,
                title,
                tool,
                output,
            } => self.handle_assemble(run, title.as_deref(), tool.as_deref(), output.as_deref()),
            Commands::Check {
                input,
                min_length,
                content_field,
                format,
            } => self.handle_check(input, *min_length, content_field.clone(), format),
            Commands::Extract { file } => self.handle_extract(file),
            Commands::Config => self.handle_config(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn min_length(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.config.batch.min_content_length)
    }

    fn content_field(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.config.batch.content_field.clone())
    }

    fn handle_run(&self, args: &RunArgs) -> Result<String, ApiError> {
        let items = load_items(&self.resolve(&args.input))?;
        let min_length = self.min_length(args.min_length);
        let content_field = self.content_field(args.content_field.clone());

        let generation = &self.config.generation;
        let endpoint = generation.endpoint.clone().ok_or_else(|| {
            ApiError::ConfigError(
                "No generation endpoint configured (set [generation].endpoint or CLASSGEN__GENERATION__ENDPOINT)"
                    .to_string(),
            )
        })?;
        let service =
            HttpGenerationService::new(endpoint, generation.api_key.clone(), generation.timeouts())?;

        let mut runner = BatchRunner::new()
            .with_identifier_policy(self.config.batch.identifier_policy())
            .with_observer(Arc::new(TracingObserver));
        if !self.quiet {
            runner = runner.with_observer(Arc::new(TerminalProgress));
        }

        let rt = runtime()?;
        let tool = args.tool.as_str();
        let run = rt.block_on(runner.run_with_service(
            items,
            json_text_at_least(min_length, content_field.clone()),
            &service,
            |item| build_generation_request(tool, item),
        ))?;

        let title = args
            .title
            .clone()
            .unwrap_or_else(|| format!("{} batch", tool));
        let mut header = ExportHeader::new(title, tool)
            .with_setting("Minimum content length", min_length.to_string());
        if let Some(field) = &content_field {
            header = header.with_setting("Content field", field.clone());
        }
        if let Some(finished) = run.finished_at() {
            header = header.with_generated_at(finished);
        }

        let mut notes = Vec::new();
        if let Some(path) = &args.output {
            let path = self.resolve(path);
            std::fs::write(&path, assemble(&run, &header.render()))?;
            notes.push(format!("Assembled text written to {}", path.display()));
        }
        if let Some(path) = &args.save_run {
            let path = self.resolve(path);
            save_run(&run, &path)?;
            notes.push(format!("Run saved to {}", path.display()));
        }
        if let Some(path) = &args.export {
            notes.push(self.export_to(&rt, &run, &header, &self.resolve(path)));
        }

        let mut out = if args.format == "json" {
            format_run_json(&run)?
        } else {
            format_run_review_text(&run)
        };
        for note in notes {
            out.push('\n');
            out.push_str(&note);
        }
        Ok(out)
    }

    /// Export never fails the command: the other outputs are already written
    /// and the saved run can be exported again later.
    fn export_to(
        &self,
        rt: &tokio::runtime::Runtime,
        run: &BatchRun<Value>,
        header: &ExportHeader,
        path: &Path,
    ) -> String {
        let export = &self.config.export;
        let Some(endpoint) = export.endpoint.clone() else {
            return "Export skipped: no export endpoint configured".to_string();
        };
        let result = HttpExportService::new(endpoint, export.api_key.clone(), export.timeouts())
            .map(|service| rt.block_on(export_run(&service, run, header)));
        match result.and_then(|r| r) {
            Ok(document) => match std::fs::write(path, &document.bytes) {
                Ok(()) => format!(
                    "Exported {} byte(s) to {}{}",
                    document.bytes.len(),
                    path.display(),
                    document
                        .file_name
                        .map(|name| format!(" (service file name: {})", name))
                        .unwrap_or_default()
                ),
                Err(e) => format!("Export failed: could not write {}: {}", path.display(), e),
            },
            Err(e) if e.is_retryable() => {
                format!("Export failed (retryable): {}. Results are unchanged.", e)
            }
            Err(e) => format!("Export skipped: {}", e),
        }
    }

    fn handle_assemble(
        &self,
        run_path: &Path,
        title: Option<&str>,
        tool: Option<&str>,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let run = load_run(&self.resolve(run_path))?;
        let tool = tool.unwrap_or(&self.config.export.tool_name);
        let title = title
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} batch", tool));
        let header = ExportHeader::new(title, tool)
            .with_generated_at(run.finished_at().unwrap_or_else(|| run.started_at()));
        let assembled = assemble(&run, &header.render());
        info!(
            run_id = %run.run_id(),
            sections = run.summary().completed,
            "Run re-assembled"
        );
        match output {
            Some(path) => {
                let path = self.resolve(path);
                std::fs::write(&path, &assembled)?;
                Ok(format!(
                    "{}\nAssembled text written to {}",
                    run.summary(),
                    path.display()
                ))
            }
            None => Ok(assembled),
        }
    }

    fn handle_check(
        &self,
        input: &Path,
        min_length: Option<usize>,
        content_field: Option<String>,
        format: &str,
    ) -> Result<String, ApiError> {
        let items = load_items(&self.resolve(input))?;
        let min_length = self.min_length(min_length);
        let report = preflight(
            &items,
            json_text_at_least(min_length, self.content_field(content_field)),
            self.config.batch.identifier_policy(),
        );
        if format == "json" {
            format_preflight_json(&report)
        } else {
            Ok(format_preflight_text(&report, min_length))
        }
    }

    fn handle_extract(&self, file: &Path) -> Result<String, ApiError> {
        let extraction = &self.config.extraction;
        let remote: Option<Box<dyn TextExtractor>> = match &extraction.endpoint {
            Some(endpoint) => Some(Box::new(HttpTextExtractor::new(
                endpoint.clone(),
                extraction.timeouts(),
            )?)),
            None => None,
        };
        let chain = ExtractorChain::new(remote);
        let rt = runtime()?;
        Ok(rt.block_on(extract_file(&chain, &self.resolve(file)))?)
    }

    fn handle_config(&self) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        for key in [&mut config.generation.api_key, &mut config.export.api_key] {
            if key.is_some() {
                *key = Some(REDACTED.to_string());
            }
        }
        toml::to_string_pretty(&config)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))
}

/// Read a batch input file: a JSON array of `{identifier, payload}`.
pub fn load_items(path: &Path) -> Result<Vec<BatchItem<Value>>, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ApiError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Read a run saved by `run --save-run`, including any hand edits.
pub fn load_run(path: &Path) -> Result<BatchRun<Value>, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ApiError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let run: BatchRun<Value> = serde_json::from_str(&raw).map_err(|e| {
        ApiError::InvalidInput(format!("Failed to parse saved run {}: {}", path.display(), e))
    })?;
    run.check_invariants().map_err(|reason| {
        ApiError::InvalidInput(format!("Saved run {} is inconsistent: {}", path.display(), reason))
    })?;
    Ok(run)
}

fn save_run(run: &BatchRun<Value>, path: &Path) -> Result<(), ApiError> {
    let raw = serde_json::to_string_pretty(run)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to serialize run: {}", e)))?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// Generation request for one item: the payload's fields plus `toolName`.
/// The identifier stays local; it labels results and is never sent.
pub fn build_generation_request(tool: &str, item: &BatchItem<Value>) -> Value {
    let mut request = match &item.payload {
        Value::Object(fields) => fields.clone(),
        other => {
            let mut fields = Map::new();
            fields.insert("content".to_string(), other.clone());
            fields
        }
    };
    request.insert("toolName".to_string(), json!(tool));
    Value::Object(request)
}

/// Progress lines on stderr: `[3/10] Generating Student 3`.
struct TerminalProgress;

impl ProgressObserver for TerminalProgress {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::ItemStarted {
                position,
                total,
                identifier,
                ..
            } => eprintln!("[{}/{}] Generating {}", position, total, identifier),
            RunEvent::ItemErrored {
                identifier, error, ..
            } => eprintln!("  {} failed: {}", identifier, error),
            _ => {}
        }
    }
}
