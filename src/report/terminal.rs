// src/report/terminal.rs
//! Human-readable report: summary counts, then grouped findings for every
//! failing or warning check.

use crate::aggregate::{Aggregate, FindingGroup, GroupedResult};
use crate::types::Severity;
use colored::Colorize;
use std::fmt::Write;

use super::RenderOptions;

#[must_use]
pub fn render(aggregate: &Aggregate, opts: &RenderOptions) -> String {
    let mut out = String::new();

    write_summary(&mut out, aggregate);

    if !opts.quiet {
        for result in &aggregate.grouped {
            write_check(&mut out, result, opts);
        }
        write_skip_notes(&mut out, aggregate);
    }

    out
}

fn write_summary(out: &mut String, aggregate: &Aggregate) {
    let s = aggregate.summary;
    let _ = writeln!(
        out,
        "Tasks: {} | Passed: {} | Warned: {} | Failed: {} | Skipped: {}",
        s.total, s.passed, s.warned, s.failed, s.skipped
    );
}

fn write_check(out: &mut String, result: &GroupedResult, opts: &RenderOptions) {
    let marker = match result.status {
        crate::types::Status::Fail => "x".red().bold(),
        _ => "~".yellow().bold(),
    };
    let duration = match (opts.verbose, result.duration_ms) {
        (true, Some(ms)) => format!(" ({ms}ms)"),
        _ => String::new(),
    };

    let _ = writeln!(out, "\n{marker} {}{duration}", result.name.bold());

    for group in &result.groups {
        write_group(out, group);
    }
}

fn write_group(out: &mut String, group: &FindingGroup) {
    let level = match group.severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warn => "warn".yellow().to_string(),
        Severity::Info => "info".dimmed().to_string(),
    };
    let _ = writeln!(out, "  {level} {} ({})", group.code, group.count);

    for file in &group.files {
        for finding in &file.findings {
            let location = match (file.file.is_empty(), finding.line) {
                (true, _) => String::new(),
                (false, Some(line)) => format!("{}:{line}  ", file.file),
                (false, None) => format!("{}  ", file.file),
            };
            let _ = writeln!(out, "    {}{}", location.blue(), finding.message);
        }
    }

    if let Some(suggestion) = &group.suggestion {
        let _ = writeln!(out, "    {} {}", "hint:".dimmed(), suggestion.dimmed());
    }
}

/// One line per skipped check so an opted-out check stays observably
/// distinct from a pass.
fn write_skip_notes(out: &mut String, aggregate: &Aggregate) {
    for result in &aggregate.results {
        if result.status != crate::types::Status::Skipped {
            continue;
        }
        let note = result.stdout.as_deref().unwrap_or("no work");
        let _ = writeln!(out, "{} {}: {}", "-".dimmed(), result.name.dimmed(), note.dimmed());
    }
}
