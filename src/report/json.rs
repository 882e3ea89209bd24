// src/report/json.rs
//! Machine-readable report: one JSON document on stdout.

use crate::aggregate::Aggregate;
use crate::types::CheckResult;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [CheckResult],
}

/// `{"results": [...]}` with each check result exactly as produced,
/// including captured stdout/stderr and artifacts. Round-trippable through
/// [`crate::types::CheckResult`] deserialization.
///
/// # Errors
/// Returns error if serialization fails.
pub fn render(aggregate: &Aggregate) -> Result<String> {
    let report = JsonReport {
        results: &aggregate.results,
    };
    let mut out = serde_json::to_string_pretty(&report).context("serializing report")?;
    out.push('\n');
    Ok(out)
}
