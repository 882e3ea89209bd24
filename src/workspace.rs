// src/workspace.rs
//! Workspace root location by upward marker search.

use std::path::{Path, PathBuf};

/// Multi-package workspace manifests, checked before generic package
/// manifests.
const WORKSPACE_MARKERS: &[&str] = &[
    "pnpm-workspace.yaml",
    "pnpm-workspace.yml",
    "lerna.json",
    "rush.json",
];

/// Generic single-package manifests.
const PACKAGE_MARKERS: &[&str] = &["package.json", "Cargo.toml", "go.mod", "pyproject.toml"];

/// Walks upward from `start` and returns the first directory containing a
/// workspace marker, or failing that the first directory containing a
/// package manifest, or `start` unchanged when neither exists up to the
/// filesystem root. Pure aside from existence probes; safe to call
/// concurrently.
#[must_use]
pub fn find_root(start: &Path) -> PathBuf {
    let mut package_root: Option<PathBuf> = None;

    let mut dir = Some(start);
    while let Some(d) = dir {
        if contains_any(d, WORKSPACE_MARKERS) {
            return d.to_path_buf();
        }
        if package_root.is_none() && contains_any(d, PACKAGE_MARKERS) {
            package_root = Some(d.to_path_buf());
        }
        dir = d.parent();
    }

    package_root.unwrap_or_else(|| start.to_path_buf())
}

fn contains_any(dir: &Path, markers: &[&str]) -> bool {
    markers.iter().any(|m| dir.join(m).is_file())
}
