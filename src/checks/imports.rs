// src/checks/imports.rs
//! Hexagonal layering: domain sources must stay free of adapter and
//! framework imports.
//!
//! This check is cache-aware: files whose content hash matches the stored
//! partition are not rescanned, and a run with nothing stale is reported
//! as skipped.

use crate::cache::HashCache;
use crate::context::{Check, CheckContext};
use crate::types::{CheckResult, Finding};
use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const PURITY: &str = "architecture/domain-pure";
const FRAMEWORK: &str = "architecture/no-framework-in-domain";

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+[^'"]*from\s+['"]([^'"]+)['"]"#)
        .unwrap_or_else(|_| panic!("invalid import regex"))
});

/// Module specifiers that mean the domain layer reached outward.
const ADAPTER_SEGMENTS: &[&str] = &["adapters/", "infrastructure/", "infra/"];
const FRAMEWORKS: &[&str] = &["express", "fastify", "react", "vue", "@nestjs"];

pub struct HexImports;

impl Check for HexImports {
    fn name(&self) -> &str {
        "Hexagonal imports"
    }

    fn run(&self, ctx: &CheckContext) -> Result<CheckResult> {
        let mut domain_files: Vec<_> = ctx
            .files_with_extension(&["ts", "tsx"])
            .into_iter()
            .filter(|p| in_domain_layer(p))
            .collect();
        domain_files.sort();

        if domain_files.is_empty() {
            return Ok(CheckResult::skipped(self.name(), "no domain sources in scope"));
        }

        let mut cache = HashCache::load(&ctx.cwd);
        let (stale, mut hashes) = cache.stale_files(self.name(), &domain_files);

        if stale.is_empty() {
            return Ok(CheckResult::skipped(self.name(), "cache hit: no domain sources changed"));
        }

        let mut findings = Vec::new();
        for file in &stale {
            let Ok(content) = fs::read_to_string(ctx.cwd.join(file)) else {
                continue;
            };
            scan_file(file, &content, &mut findings);
        }

        // Only clean files earn a cache entry; dirty ones must be rescanned
        // next run even when unmodified.
        for finding in &findings {
            if let Some(file) = &finding.file {
                hashes.remove(&file.to_string_lossy().to_string());
            }
        }
        cache.store_partition(self.name(), hashes);

        Ok(CheckResult::from_findings(self.name(), findings))
    }
}

fn in_domain_layer(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_string_lossy() == "domain")
}

fn scan_file(file: &Path, content: &str, findings: &mut Vec<Finding>) {
    for (idx, line) in content.lines().enumerate() {
        let Some(captures) = IMPORT_RE.captures(line) else {
            continue;
        };
        let Some(specifier) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let line_no = idx + 1;

        if ADAPTER_SEGMENTS.iter().any(|seg| specifier.contains(seg)) {
            findings.push(
                Finding::error(PURITY, format!("domain imports adapter module `{specifier}`"))
                    .in_file(file.to_path_buf())
                    .at_line(line_no)
                    .suggest("depend on a domain port; let the composition root wire the adapter"),
            );
        } else if FRAMEWORKS.iter().any(|fw| matches_package(specifier, fw)) {
            findings.push(
                Finding::error(
                    FRAMEWORK,
                    format!("domain imports framework package `{specifier}`"),
                )
                .in_file(file.to_path_buf())
                .at_line(line_no),
            );
        }
    }
}

/// `express` and `express/lib/router` match; `express-validator` does not.
fn matches_package(specifier: &str, package: &str) -> bool {
    specifier == package || specifier.starts_with(&format!("{package}/"))
}
