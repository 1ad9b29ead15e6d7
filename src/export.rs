//! Export: assemble completed results into one document and hand it to the
//! export service.

pub mod assembler;
pub mod service;

pub use assembler::{assemble, ExportHeader, SECTION_SEPARATOR};
pub use service::{export_run, ExportDocument, ExportRequest, ExportService, HttpExportService};
