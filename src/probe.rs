// src/probe.rs
//! External-tool availability probing.
//!
//! Probes are memoized per `(command, cwd)` for the process lifetime;
//! nothing persists across runs. A failed probe is an answer, not an
//! error: missing tools make checks skip, never fail.

use crate::process;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?(\d+\.\d+\.\d+)").unwrap_or_else(|_| panic!("invalid version regex"))
});

static MEMO: LazyLock<Mutex<HashMap<(String, PathBuf), ToolInfo>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The answer to "is this tool usable here?".
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn unavailable() -> Self {
        Self {
            available: false,
            version: None,
            path: None,
        }
    }
}

/// Probes `command --version` under `cwd`.
#[must_use]
pub fn probe(command: &str, cwd: &Path) -> ToolInfo {
    probe_with_args(command, &["--version"], cwd)
}

/// Probes with a custom argument vector for tools that spell their version
/// flag differently. A non-zero exit, spawn error, or timeout yields
/// `available = false` without raising.
#[must_use]
pub fn probe_with_args(command: &str, args: &[&str], cwd: &Path) -> ToolInfo {
    let key = (command.to_string(), cwd.to_path_buf());

    if let Ok(memo) = MEMO.lock() {
        if let Some(hit) = memo.get(&key) {
            return hit.clone();
        }
    }

    let info = run_probe(command, args, cwd);

    if let Ok(mut memo) = MEMO.lock() {
        // First writer wins; a concurrent probe of the same key computed
        // the same answer.
        memo.entry(key).or_insert_with(|| info.clone());
    }
    info
}

fn run_probe(command: &str, args: &[&str], cwd: &Path) -> ToolInfo {
    match process::run(command, args, cwd, Some(PROBE_TIMEOUT)) {
        Ok(out) if out.success() => ToolInfo {
            available: true,
            // Many tools print their version to stderr.
            version: parse_version(&out.stdout).or_else(|| parse_version(&out.stderr)),
            path: find_in_path(command),
        },
        _ => ToolInfo::unavailable(),
    }
}

fn parse_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn find_in_path(command: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}
