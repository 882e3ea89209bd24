// src/aggregate.rs
//! Pure aggregation of check results into the structure reporters consume.

use crate::types::{CheckResult, Finding, Severity, Status};
use std::collections::BTreeMap;

/// Top-line partition counts over the result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// One check's findings grouped by rule code.
#[derive(Debug, Clone)]
pub struct FindingGroup {
    pub code: String,
    /// Most severe level among the group's findings.
    pub severity: Severity,
    pub count: usize,
    /// First suggestion seen in the group, if any.
    pub suggestion: Option<String>,
    /// Per-file occurrence lists, files sorted lexicographically.
    /// Pipeline-level findings without a file sort first under "".
    pub files: Vec<FileFindings>,
}

#[derive(Debug, Clone)]
pub struct FileFindings {
    pub file: String,
    pub findings: Vec<Finding>,
}

/// A failing or warning check with its grouped findings.
#[derive(Debug, Clone)]
pub struct GroupedResult {
    pub name: String,
    pub status: Status,
    pub duration_ms: Option<u64>,
    pub groups: Vec<FindingGroup>,
}

/// The aggregator's full output: counts, fail/warn groupings, and the
/// untouched ordered result list. Sole input to reporters.
pub struct Aggregate {
    pub summary: Summary,
    pub grouped: Vec<GroupedResult>,
    pub results: Vec<CheckResult>,
}

/// Deterministic: the same input list always yields the same structure.
#[must_use]
pub fn aggregate(results: Vec<CheckResult>) -> Aggregate {
    let summary = summarize(&results);
    let grouped = results
        .iter()
        .filter(|r| matches!(r.status, Status::Fail | Status::Warn))
        .map(group_result)
        .collect();

    Aggregate {
        summary,
        grouped,
        results,
    }
}

fn summarize(results: &[CheckResult]) -> Summary {
    let mut summary = Summary {
        total: results.len(),
        ..Summary::default()
    };
    for result in results {
        match result.status {
            Status::Pass => summary.passed += 1,
            Status::Warn => summary.warned += 1,
            Status::Fail => summary.failed += 1,
            Status::Skipped => summary.skipped += 1,
        }
    }
    summary
}

fn group_result(result: &CheckResult) -> GroupedResult {
    // Preserve first-seen code order while accumulating, then sort groups
    // by severity, then code.
    let mut order: Vec<String> = Vec::new();
    let mut by_code: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();

    for finding in &result.findings {
        if !by_code.contains_key(&finding.code) {
            order.push(finding.code.clone());
        }
        by_code.entry(finding.code.clone()).or_default().push(finding);
    }

    let mut groups: Vec<FindingGroup> = order
        .into_iter()
        .map(|code| {
            let members = &by_code[&code];
            build_group(code, members)
        })
        .collect();
    groups.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.code.cmp(&b.code)));

    GroupedResult {
        name: result.name.clone(),
        status: result.status,
        duration_ms: result.duration_ms,
        groups,
    }
}

fn build_group(code: String, members: &[&Finding]) -> FindingGroup {
    let severity = members
        .iter()
        .map(|f| f.severity)
        .min()
        .unwrap_or(Severity::Info);
    let suggestion = members.iter().find_map(|f| f.suggestion.clone());

    let mut by_file: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
    for finding in members {
        let key = finding
            .file
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        by_file.entry(key).or_default().push((*finding).clone());
    }

    FindingGroup {
        code,
        severity,
        count: members.len(),
        suggestion,
        files: by_file
            .into_iter()
            .map(|(file, findings)| FileFindings { file, findings })
            .collect(),
    }
}
