// src/scope.rs
//! File-selection inputs: git scope resolution and explicit path
//! expansion.
//!
//! Git failures of any kind degrade to an empty list, never an error, so
//! the engine stays usable outside version-controlled trees.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Directories never descended into when walking.
const PRUNED_DIR: &str = "node_modules";

/// Modified/added/renamed files in the index against HEAD.
#[must_use]
pub fn staged_files(root: &Path) -> Vec<PathBuf> {
    git_paths(
        root,
        &["diff", "--cached", "--name-only", "--diff-filter=ACMR", "-z"],
    )
    .unwrap_or_default()
}

/// Files changed against the tracked upstream (symmetric difference); with
/// no upstream, falls back to a diff against the previous commit.
#[must_use]
pub fn changed_files(root: &Path) -> Vec<PathBuf> {
    git_paths(root, &["diff", "--name-only", "-z", "@{upstream}...HEAD"])
        .or_else(|| git_paths(root, &["diff", "--name-only", "-z", "HEAD~1"]))
        .unwrap_or_default()
}

/// Runs git and parses NUL-separated paths. `None` on spawn failure or a
/// non-zero exit.
fn git_paths(root: &Path, args: &[&str]) -> Option<Vec<PathBuf>> {
    let out = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .ok()?;

    if !out.status.success() {
        return None;
    }

    Some(
        out.stdout
            .split(|&b| b == 0)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| PathBuf::from(String::from_utf8_lossy(chunk).as_ref()))
            .collect(),
    )
}

// --- Path expansion ---

/// Expands explicit path arguments to a deduplicated, repo-relative file
/// list. Files are included verbatim; directories are walked recursively,
/// skipping dot-directories and `node_modules`. First-seen order is
/// preserved.
#[must_use]
pub fn resolve_paths(paths: &[PathBuf], cwd: &Path, root: &Path) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut resolved = Vec::new();

    for path in paths {
        let abs = if path.is_absolute() {
            path.clone()
        } else {
            cwd.join(path)
        };

        if abs.is_dir() {
            for file in walk_files(&abs) {
                push_unique(&mut resolved, &mut seen, relative_to(&file, root));
            }
        } else if abs.is_file() {
            push_unique(&mut resolved, &mut seen, relative_to(&abs, root));
        }
        // Nonexistent paths are dropped silently; the run simply has
        // nothing to do for them.
    }

    resolved
}

/// Full-scope enumeration: every file under `root`, repo-relative, with
/// the standard pruning.
#[must_use]
pub fn walk_tree(root: &Path) -> Vec<PathBuf> {
    walk_files(root)
        .into_iter()
        .map(|p| relative_to(&p, root))
        .collect()
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_prune(&e.file_name().to_string_lossy()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn should_prune(name: &str) -> bool {
    (name.starts_with('.') && name.len() > 1) || name == PRUNED_DIR
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn push_unique(list: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    if seen.insert(path.clone()) {
        list.push(path);
    }
}
