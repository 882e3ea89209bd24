// src/context.rs
//! The check contract: the immutable context a check receives and the
//! trait every check implements.

use crate::config::{Scope, ValidatorConfig};
use crate::scope;
use crate::types::CheckResult;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only record handed to every check.
///
/// Built once per run, before any stage starts, and shared by reference
/// across concurrently executing checks. All file lists are
/// repository-relative.
#[derive(Clone)]
pub struct CheckContext {
    /// Absolute repository working directory.
    pub cwd: PathBuf,
    /// Whether this is a CI invocation.
    pub ci: bool,
    pub scope: Scope,
    pub staged_files: Vec<PathBuf>,
    pub changed_files: Vec<PathBuf>,
    /// Explicit files/directories the user passed. When present, checks
    /// must restrict themselves to it.
    pub target_files: Option<Vec<PathBuf>>,
    /// Process environment snapshot.
    pub env: HashMap<String, String>,
    /// The full pipeline configuration, so a check can inspect flags such
    /// as the e2e mode.
    pub config: ValidatorConfig,
}

impl CheckContext {
    /// The scope-selected file list for this run.
    ///
    /// Explicit target files take precedence over the scope. `None` means
    /// full-tree scope with no targets: the check enumerates whatever it
    /// cares about itself (see [`Self::files_with_extension`]).
    #[must_use]
    pub fn candidate_files(&self) -> Option<&[PathBuf]> {
        if let Some(targets) = &self.target_files {
            return Some(targets);
        }
        match self.scope {
            Scope::Staged => Some(&self.staged_files),
            Scope::Changed => Some(&self.changed_files),
            Scope::Full => None,
        }
    }

    /// Scope-selected files with one of the given extensions. Under full
    /// scope this walks the tree rooted at `cwd`.
    #[must_use]
    pub fn files_with_extension(&self, extensions: &[&str]) -> Vec<PathBuf> {
        let matches = |p: &Path| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e))
        };
        match self.candidate_files() {
            Some(files) => files.iter().filter(|p| matches(p)).cloned().collect(),
            None => scope::walk_tree(&self.cwd)
                .into_iter()
                .filter(|p| matches(p))
                .collect(),
        }
    }

    /// Environment lookup honoring the run snapshot.
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }
}

/// An independent validator with a stable name and a single operation.
///
/// Contract:
/// - Return [`crate::types::Status::Skipped`] when there is no work (no
///   relevant files, required tool absent) rather than `Pass`.
/// - Never mutate the context, the configuration, or shared state other
///   than the check's own cache partition.
/// - Writes to the repository (autofix) are allowed only when
///   `scope == Staged`, CI is false, and a cache lookup proves the targeted
///   files changed since the last run.
/// - An `Err` or panic is caught by the scheduler and converted into a
///   fail-status result, so sibling checks keep running.
///
/// The scheduler stamps the result's `stage` and `duration_ms`.
pub trait Check: Send + Sync {
    /// Display name, also the check's cache partition key.
    fn name(&self) -> &str;

    fn run(&self, ctx: &CheckContext) -> Result<CheckResult>;
}
