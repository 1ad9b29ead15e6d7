//! Integration tests for the classgen batch generation pipeline

mod batch_runner;
mod config_integration;
mod export_assembly;
