// src/scheduler.rs
//! Stage execution: sequential across stages, bounded fan-out within one.
//!
//! Error isolation is absolute: a check that returns `Err` or panics
//! becomes a fail-status result and its siblings keep running. When a
//! stage fails its policy, in-flight checks finish (their results are
//! retained) and no later stage starts.

use crate::config::{StageSpec, ValidatorConfig};
use crate::context::{Check, CheckContext};
use crate::types::{CheckResult, Finding, Status};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Hard ceiling on stage fan-out, so one run never floods a large machine
/// with concurrent subprocesses.
pub const MAX_WORKERS: usize = 8;

/// `(ok, results)` for a full pipeline run. `ok` is true iff every stage
/// passed its policy.
pub struct PipelineOutcome {
    pub ok: bool,
    pub results: Vec<CheckResult>,
}

/// Worker count used when the caller does not ask for one.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(2)
        .clamp(2, 4)
}

/// Runs every stage in declaration order and applies the stage-termination
/// policy between stages.
#[must_use]
pub fn run_pipeline(
    config: &ValidatorConfig,
    ctx: &CheckContext,
    max_workers: usize,
) -> PipelineOutcome {
    let workers = max_workers.clamp(1, MAX_WORKERS);

    let mut results = Vec::with_capacity(config.check_count());
    for stage in &config.stages {
        let stage_results = if stage.parallel && workers > 1 && stage.checks.len() > 1 {
            run_parallel(stage, ctx, workers)
        } else {
            run_sequential(stage, ctx)
        };

        let aborted = stage_failed(stage, &stage_results);
        results.extend(stage_results);

        if aborted {
            return PipelineOutcome { ok: false, results };
        }
    }

    PipelineOutcome { ok: true, results }
}

/// A stage fails its policy on any fail, or on any warn when the stage is
/// marked warn-fatal.
fn stage_failed(stage: &StageSpec, results: &[CheckResult]) -> bool {
    results.iter().any(|r| {
        r.status == Status::Fail || (stage.fail_on_warn && r.status == Status::Warn)
    })
}

fn run_sequential(stage: &StageSpec, ctx: &CheckContext) -> Vec<CheckResult> {
    stage
        .checks
        .iter()
        .map(|check| execute(check.as_ref(), stage, ctx))
        .collect()
}

/// Runs the stage's checks on a dedicated bounded pool. Results arrive in
/// completion order and are re-sorted to declaration order before the
/// stage closes, so reporting is deterministic regardless of scheduling.
fn run_parallel(stage: &StageSpec, ctx: &CheckContext, workers: usize) -> Vec<CheckResult> {
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(_) => return run_sequential(stage, ctx),
    };

    let mut indexed: Vec<(usize, CheckResult)> = pool.install(|| {
        stage
            .checks
            .par_iter()
            .enumerate()
            .map(|(idx, check)| (idx, execute(check.as_ref(), stage, ctx)))
            .collect()
    });

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, result)| result).collect()
}

/// Invokes one check, converting `Err` and panics into fail results, then
/// stamps the stage name and wall-clock duration.
fn execute(check: &dyn Check, stage: &StageSpec, ctx: &CheckContext) -> CheckResult {
    let start = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(ctx)));
    let mut result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => crashed(check.name(), &format!("{e:#}"), Some(format!("{e:?}"))),
        Err(payload) => crashed(check.name(), &panic_text(payload.as_ref()), None),
    };

    #[allow(clippy::cast_possible_truncation)]
    {
        result.duration_ms = Some(start.elapsed().as_millis() as u64);
    }
    result.stage = Some(stage.name.clone());
    result
}

fn crashed(name: &str, message: &str, detail: Option<String>) -> CheckResult {
    let mut result = CheckResult::from_findings(
        name,
        vec![Finding::error(
            "pipeline/check-crashed",
            format!("check crashed: {message}"),
        )],
    );
    result.stderr = detail.filter(|d| !d.is_empty());
    result
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}
