// src/report/mod.rs
//! Reporters: render the aggregated result in one of three formats.
//!
//! All renderers build a `String`; the driver owns stdout, and nothing is
//! printed while checks are still running.

pub mod json;
pub mod junit;
pub mod terminal;

use crate::aggregate::Aggregate;
use crate::config::ReportFormat;
use anyhow::Result;

/// Knobs that only affect the terminal renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Summary block only.
    pub quiet: bool,
    /// Include per-check durations.
    pub verbose: bool,
}

/// Renders the aggregate with the chosen reporter.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn render(format: ReportFormat, aggregate: &Aggregate, opts: &RenderOptions) -> Result<String> {
    match format {
        ReportFormat::Summary => Ok(terminal::render(aggregate, opts)),
        ReportFormat::Json => json::render(aggregate),
        ReportFormat::Junit => Ok(junit::render(aggregate)),
    }
}
