// src/checks/external.rs
//! Generic external-tool check: probe, run, capture, interpret.
//!
//! A missing tool is a skip with an installation hint, never a failure.
//! Retry behavior follows the `VALIDATOR_RETRIES` /
//! `VALIDATOR_RETRY_DELAY_MS` convention; the engine itself never retries.

use crate::context::{Check, CheckContext};
use crate::probe;
use crate::process;
use crate::config::E2eMode;
use crate::types::{CheckResult, Finding, Severity};
use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

const RETRIES_VAR: &str = "VALIDATOR_RETRIES";
const RETRY_DELAY_VAR: &str = "VALIDATOR_RETRY_DELAY_MS";
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// A check that shells out to one tool and maps its outcome to findings.
pub struct ToolCheck {
    name: String,
    command: String,
    args: Vec<String>,
    install_hint: String,
    /// Gate on the pipeline's e2e mode.
    e2e: bool,
}

impl ToolCheck {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: &[&str],
        install_hint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            install_hint: install_hint.into(),
            e2e: false,
        }
    }

    #[must_use]
    pub fn eslint() -> Self {
        Self::new("ESLint", "eslint", &["."], "npm install -D eslint")
    }

    #[must_use]
    pub fn typescript() -> Self {
        Self::new(
            "TypeScript",
            "tsc",
            &["--noEmit"],
            "npm install -D typescript",
        )
    }

    #[must_use]
    pub fn playwright() -> Self {
        let mut check = Self::new(
            "E2E suite",
            "playwright",
            &["test"],
            "npm install -D @playwright/test",
        );
        check.e2e = true;
        check
    }

    fn e2e_gate(&self, ctx: &CheckContext) -> Option<CheckResult> {
        if !self.e2e {
            return None;
        }
        match ctx.config.e2e {
            E2eMode::Off => Some(CheckResult::skipped(&self.name, "e2e disabled")),
            E2eMode::Auto if !ctx.ci => {
                Some(CheckResult::skipped(&self.name, "e2e runs under CI only"))
            }
            _ => None,
        }
    }

    fn run_with_retries(&self, ctx: &CheckContext) -> Result<process::ProcessOutput> {
        let retries = env_u64(ctx, RETRIES_VAR).unwrap_or(0);
        let delay = env_u64(ctx, RETRY_DELAY_VAR).unwrap_or(DEFAULT_RETRY_DELAY_MS);
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();

        let mut attempt = 0;
        loop {
            let out = process::run(&self.command, &args, &ctx.cwd, None)?;
            if out.success() || attempt >= retries {
                return Ok(out);
            }
            attempt += 1;
            thread::sleep(Duration::from_millis(delay));
        }
    }
}

impl Check for ToolCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &CheckContext) -> Result<CheckResult> {
        if let Some(gated) = self.e2e_gate(ctx) {
            return Ok(gated);
        }

        let info = probe::probe(&self.command, &ctx.cwd);
        if !info.available {
            return Ok(CheckResult::skipped(
                &self.name,
                format!("{} not found — {}", self.command, self.install_hint),
            ));
        }

        let out = self.run_with_retries(ctx)?;

        let findings = if out.success() {
            Vec::new()
        } else {
            interpret_failure(&self.command, &out)
        };

        let mut result = CheckResult::from_findings(&self.name, findings)
            .with_output(Some(out.stdout), Some(out.stderr));
        if let Some(version) = info.version {
            result.artifacts = Some(BTreeMap::from([(
                "tool_version".to_string(),
                Value::String(version),
            )]));
        }
        Ok(result)
    }
}

// --- Output interpretation ---

/// A machine summary some tools append as their final stdout line:
/// `{"diagnostics":[{file,line?,column?,severity?,code?,message}]}`.
#[derive(Deserialize)]
struct ToolSummary {
    diagnostics: Vec<ToolDiagnostic>,
}

#[derive(Deserialize)]
struct ToolDiagnostic {
    file: Option<String>,
    line: Option<usize>,
    column: Option<usize>,
    severity: Option<String>,
    code: Option<String>,
    message: String,
}

fn interpret_failure(command: &str, out: &process::ProcessOutput) -> Vec<Finding> {
    if let Some(summary) = parse_summary(&out.stdout) {
        let fallback_code = format!("tools/{command}");
        return summary
            .diagnostics
            .into_iter()
            .map(|d| diagnostic_to_finding(d, &fallback_code))
            .collect();
    }

    let detail = output_tail(out);
    vec![Finding::error(
        format!("tools/{command}"),
        format!("{command} exited with code {}{detail}", out.exit_code),
    )]
}

fn parse_summary(stdout: &str) -> Option<ToolSummary> {
    let last = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    serde_json::from_str(last.trim()).ok()
}

fn diagnostic_to_finding(d: ToolDiagnostic, fallback_code: &str) -> Finding {
    let severity = match d.severity.as_deref() {
        Some("warn" | "warning") => Severity::Warn,
        Some("info") => Severity::Info,
        _ => Severity::Error,
    };
    let mut finding = Finding::new(severity, d.code.unwrap_or_else(|| fallback_code.to_string()), d.message);
    if let Some(file) = d.file {
        finding = finding.in_file(file);
    }
    if let Some(line) = d.line {
        finding = finding.at_line(line);
    }
    if let Some(column) = d.column {
        finding = finding.at_column(column);
    }
    finding
}

fn output_tail(out: &process::ProcessOutput) -> String {
    let combined = if out.stderr.trim().is_empty() {
        &out.stdout
    } else {
        &out.stderr
    };
    let tail: Vec<&str> = combined.lines().rev().take(3).collect();
    if tail.is_empty() {
        String::new()
    } else {
        let mut lines: Vec<&str> = tail.into_iter().rev().collect();
        lines.retain(|l| !l.trim().is_empty());
        format!(": {}", lines.join(" | "))
    }
}

fn env_u64(ctx: &CheckContext, key: &str) -> Option<u64> {
    ctx.env_var(key)?.trim().parse().ok()
}
