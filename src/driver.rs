// src/driver.rs
//! CLI surface and run assembly: parse arguments, wire the components,
//! choose a reporter, set the exit code.

use crate::checks;
use crate::config::{E2eMode, ReportFormat, RunOptions, Scope, ValidatorConfig};
use crate::context::CheckContext;
use crate::report::{self, RenderOptions};
use crate::scheduler;
use crate::scope;
use crate::workspace;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hex-validate",
    version,
    about = "Architecture validator: staged pipelines of structural checks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CommandKind,

    /// File-selection mode (default: staged for fast, full otherwise or under CI)
    #[arg(long, value_enum, global = true)]
    pub scope: Option<Scope>,

    /// End-to-end suite participation
    #[arg(long, value_enum, global = true)]
    pub e2e: Option<E2eMode>,

    /// Report format
    #[arg(long, value_enum, global = true)]
    pub report: Option<ReportFormat>,

    /// Worker cap for parallel stages (clamped to 1..=8)
    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    /// Summary only
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Include per-check durations
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Restrict the run to these files/directories
    #[arg(long, value_delimiter = ',', global = true)]
    pub paths: Option<Vec<PathBuf>>,

    /// Run as if invoked from this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Quick pre-commit pass over staged files
    Fast,
    /// Full-tree validation
    Full,
    /// Full-tree validation with CI defaults
    Ci,
    /// Scaffold a starter configuration
    Init,
}

/// Runs the parsed CLI to completion and returns the process exit code.
///
/// `user_config` is a pipeline configuration loaded out of band (the
/// engine does not define a config file format); `None` falls back to the
/// built-in default stage list.
///
/// # Errors
/// Returns error on pre-run fatals (bad cwd, broken reporter); the caller
/// prints it to stderr and exits 1.
pub fn run(cli: Cli, user_config: Option<ValidatorConfig>) -> Result<i32> {
    if cli.command == CommandKind::Init {
        println!("init scaffolding ships with the project template, not this binary");
        return Ok(0);
    }

    let mut config = user_config.unwrap_or_else(checks::default_pipeline);
    if let Some(e2e) = cli.e2e {
        config.e2e = e2e;
    }

    let ci = cli.command == CommandKind::Ci || env_ci();
    let opts = resolve_options(&cli, &config, ci);
    let (ok, rendered) = execute(&config, &opts)?;
    print!("{rendered}");

    Ok(i32::from(!ok))
}

/// Applies flag precedence: CLI flags override CI-biased command defaults,
/// which override compiled-in defaults.
fn resolve_options(cli: &Cli, config: &ValidatorConfig, ci: bool) -> RunOptions {
    // CI mode biases the scope default toward the full tree, even for
    // `fast`; an explicit --scope still wins.
    let scope = cli.scope.unwrap_or(match cli.command {
        CommandKind::Fast if !ci => Scope::Staged,
        _ => Scope::Full,
    });
    let report = cli
        .report
        .or_else(|| config.reports.first().copied())
        .unwrap_or(ReportFormat::Summary);

    RunOptions {
        scope,
        ci,
        max_workers: cli.max_workers.unwrap_or_else(scheduler::default_workers),
        report,
        quiet: cli.quiet,
        verbose: cli.verbose,
        paths: cli.paths.clone(),
        cwd: cli.cwd.clone(),
    }
}

/// Builds the shared context, runs the scheduler, and renders the chosen
/// reporter. Returns `(overall_ok, rendered_report)`.
///
/// # Errors
/// Returns error if the working directory is unusable or rendering fails.
pub fn execute(config: &ValidatorConfig, opts: &RunOptions) -> Result<(bool, String)> {
    let invoked_from = match &opts.cwd {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("--cwd {} is not usable", dir.display()))?,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let root = workspace::find_root(&invoked_from);

    let ctx = CheckContext {
        staged_files: scope::staged_files(&root),
        changed_files: scope::changed_files(&root),
        target_files: opts
            .paths
            .as_ref()
            .map(|paths| scope::resolve_paths(paths, &invoked_from, &root)),
        cwd: root,
        ci: opts.ci,
        scope: opts.scope,
        env: std::env::vars().collect(),
        config: config.clone(),
    };

    let outcome = scheduler::run_pipeline(config, &ctx, opts.max_workers);
    let aggregate = crate::aggregate::aggregate(outcome.results);
    let rendered = report::render(
        opts.report,
        &aggregate,
        &RenderOptions {
            quiet: opts.quiet,
            verbose: opts.verbose,
        },
    )?;

    Ok((outcome.ok, rendered))
}

/// CI mode is implied by a truthy `CI` environment variable.
fn env_ci() -> bool {
    std::env::var("CI").map(|v| is_truthy(&v)).unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
