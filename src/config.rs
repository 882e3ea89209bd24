// src/config.rs
//! Pipeline configuration: scopes, stages, and run options.
//!
//! How a user *describes* the stage list (config file, compiled-in
//! defaults) is outside the engine; this module only defines the in-memory
//! shapes the scheduler and driver consume. See `checks::default_pipeline`
//! for the compiled-in fallback.

use crate::context::Check;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// File-selection mode for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Index vs HEAD.
    Staged,
    /// Working tree vs tracked upstream.
    Changed,
    /// Everything.
    Full,
}

/// Whether the end-to-end suite participates in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum E2eMode {
    /// Run only under CI.
    Auto,
    Always,
    Off,
}

/// Reporter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Summary,
    Json,
    Junit,
}

/// An ordered list of checks with a concurrency flag and a warn-fatality
/// flag.
#[derive(Clone)]
pub struct StageSpec {
    pub name: String,
    pub parallel: bool,
    pub fail_on_warn: bool,
    pub checks: Vec<Arc<dyn Check>>,
}

impl StageSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, parallel: bool, checks: Vec<Arc<dyn Check>>) -> Self {
        Self {
            name: name.into(),
            parallel,
            fail_on_warn: false,
            checks,
        }
    }

    #[must_use]
    pub fn fail_on_warn(mut self) -> Self {
        self.fail_on_warn = true;
        self
    }
}

/// The full pipeline: ordered stages plus global defaults.
#[derive(Clone)]
pub struct ValidatorConfig {
    pub stages: Vec<StageSpec>,
    pub e2e: E2eMode,
    pub reports: Vec<ReportFormat>,
}

impl ValidatorConfig {
    /// An empty pipeline. Useful for embedders that assemble stages
    /// programmatically.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            stages: Vec::new(),
            e2e: E2eMode::Off,
            reports: vec![ReportFormat::Summary],
        }
    }

    #[must_use]
    pub fn with_stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Total number of checks across all stages.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.stages.iter().map(|s| s.checks.len()).sum()
    }
}

/// Per-invocation options, resolved by the driver from CLI flags and
/// environment before any stage starts.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scope: Scope,
    pub ci: bool,
    pub max_workers: usize,
    pub report: ReportFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub paths: Option<Vec<PathBuf>>,
    pub cwd: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scope: Scope::Full,
            ci: false,
            max_workers: crate::scheduler::default_workers(),
            report: ReportFormat::Summary,
            quiet: false,
            verbose: false,
            paths: None,
            cwd: None,
        }
    }
}
