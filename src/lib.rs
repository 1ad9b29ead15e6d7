//! classgen: batch content generation with per-item failure isolation
//!
//! Runs a generation service over a list of labelled items one at a time,
//! records a completed, skipped or errored result for every item, and
//! assembles the completed results into a single reviewable document for
//! export.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod generation;
pub mod http;
pub mod logging;
pub mod privacy;
pub mod progress;
