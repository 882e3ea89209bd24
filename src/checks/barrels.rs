// src/checks/barrels.rs
//! Flags barrel modules: index files whose entire body is re-exports.
//! Barrels blur composition boundaries and defeat dead-export analysis.

use crate::context::{Check, CheckContext};
use crate::types::{CheckResult, Finding};
use anyhow::Result;
use std::fs;
use std::path::Path;

const CODE: &str = "composition/no-barrels";

pub struct NoBarrels;

impl Check for NoBarrels {
    fn name(&self) -> &str {
        "Barrel files"
    }

    fn run(&self, ctx: &CheckContext) -> Result<CheckResult> {
        let mut candidates: Vec<_> = ctx
            .files_with_extension(&["ts", "tsx"])
            .into_iter()
            .filter(|p| is_index(p))
            .collect();
        candidates.sort();

        if candidates.is_empty() {
            return Ok(CheckResult::skipped(self.name(), "no index modules in scope"));
        }

        let mut findings = Vec::new();
        for file in &candidates {
            let Ok(content) = fs::read_to_string(ctx.cwd.join(file)) else {
                continue;
            };
            if is_barrel(&content) {
                findings.push(
                    Finding::warn(CODE, "index module only re-exports")
                        .in_file(file.clone())
                        .at_line(1)
                        .suggest("import from the concrete module instead of the barrel"),
                );
            }
        }

        Ok(CheckResult::from_findings(self.name(), findings))
    }
}

fn is_index(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("index.ts" | "index.tsx")
    )
}

/// A barrel is a file with at least one re-export and nothing else of
/// substance.
fn is_barrel(content: &str) -> bool {
    let mut reexports = 0;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('*') || line.starts_with("/*") {
            continue;
        }
        if line.starts_with("export *") || (line.starts_with("export {") && line.contains(" from ")) {
            reexports += 1;
        } else {
            return false;
        }
    }
    reexports > 0
}
