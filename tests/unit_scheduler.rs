// tests/unit_scheduler.rs
//! Scheduler laws: declaration-order output, stage-termination policy,
//! and crash containment.

use anyhow::{bail, Result};
use hex_validate::config::{Scope, StageSpec, ValidatorConfig};
use hex_validate::context::{Check, CheckContext};
use hex_validate::scheduler::{run_pipeline, MAX_WORKERS};
use hex_validate::types::{CheckResult, Finding, Status};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// --- Helpers ---

fn ctx() -> CheckContext {
    CheckContext {
        cwd: std::env::temp_dir(),
        ci: false,
        scope: Scope::Staged,
        staged_files: Vec::new(),
        changed_files: Vec::new(),
        target_files: None,
        env: HashMap::new(),
        config: ValidatorConfig::empty(),
    }
}

struct Fixed {
    name: &'static str,
    status: Status,
}

impl Fixed {
    fn new(name: &'static str, status: Status) -> Arc<dyn Check> {
        Arc::new(Self { name, status })
    }
}

impl Check for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, _ctx: &CheckContext) -> Result<CheckResult> {
        Ok(match self.status {
            Status::Pass => CheckResult::pass(self.name),
            Status::Warn => {
                CheckResult::from_findings(self.name, vec![Finding::warn("demo/warn", "meh")])
            }
            Status::Fail => {
                CheckResult::from_findings(self.name, vec![Finding::error("demo/fail", "bad")])
            }
            Status::Skipped => CheckResult::skipped(self.name, "nothing to do"),
        })
    }
}

struct Sleepy {
    name: &'static str,
    ms: u64,
}

impl Sleepy {
    fn new(name: &'static str, ms: u64) -> Arc<dyn Check> {
        Arc::new(Self { name, ms })
    }
}

impl Check for Sleepy {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, _ctx: &CheckContext) -> Result<CheckResult> {
        thread::sleep(Duration::from_millis(self.ms));
        Ok(CheckResult::pass(self.name))
    }
}

struct Panicky;

impl Check for Panicky {
    fn name(&self) -> &str {
        "Panicky"
    }

    fn run(&self, _ctx: &CheckContext) -> Result<CheckResult> {
        panic!("boom in check");
    }
}

struct Erroring;

impl Check for Erroring {
    fn name(&self) -> &str {
        "Erroring"
    }

    fn run(&self, _ctx: &CheckContext) -> Result<CheckResult> {
        bail!("tool output was garbage")
    }
}

fn names(results: &[CheckResult]) -> Vec<&str> {
    results.iter().map(|r| r.name.as_str()).collect()
}

// --- Ordering ---

#[test]
fn parallel_stage_preserves_declaration_order() {
    // Distinct latencies so completion order differs from declaration
    // order under any schedule.
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "parallel",
        true,
        vec![
            Sleepy::new("A", 100),
            Sleepy::new("B", 10),
            Sleepy::new("C", 50),
            Sleepy::new("D", 1),
            Sleepy::new("E", 20),
        ],
    ));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(outcome.ok);
    assert_eq!(names(&outcome.results), vec!["A", "B", "C", "D", "E"]);
}

#[test]
fn stage_order_matches_configuration() {
    let config = ValidatorConfig::empty()
        .with_stage(StageSpec::new("one", false, vec![Fixed::new("P", Status::Pass)]))
        .with_stage(StageSpec::new("two", true, vec![Fixed::new("Q", Status::Pass)]));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert_eq!(outcome.results[0].stage.as_deref(), Some("one"));
    assert_eq!(outcome.results[1].stage.as_deref(), Some("two"));
}

// --- Stage policy ---

#[test]
fn failing_stage_aborts_the_pipeline() {
    let config = ValidatorConfig::empty()
        .with_stage(StageSpec::new(
            "first",
            false,
            vec![Fixed::new("P", Status::Pass), Fixed::new("F", Status::Fail)],
        ))
        .with_stage(StageSpec::new("second", false, vec![Fixed::new("Q", Status::Pass)]));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(!outcome.ok);
    assert_eq!(names(&outcome.results), vec!["P", "F"]);
}

#[test]
fn fail_on_warn_makes_a_warn_fatal() {
    let config = ValidatorConfig::empty()
        .with_stage(
            StageSpec::new("strict", false, vec![Fixed::new("W", Status::Warn)]).fail_on_warn(),
        )
        .with_stage(StageSpec::new("after", false, vec![Fixed::new("Q", Status::Pass)]));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(!outcome.ok);
    assert_eq!(outcome.results.len(), 1);
}

#[test]
fn plain_warns_do_not_abort() {
    let config = ValidatorConfig::empty()
        .with_stage(StageSpec::new("lenient", false, vec![Fixed::new("W", Status::Warn)]))
        .with_stage(StageSpec::new("after", false, vec![Fixed::new("Q", Status::Pass)]));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(outcome.ok);
    assert_eq!(outcome.results.len(), 2);
}

#[test]
fn skips_never_fail_the_pipeline() {
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "only",
        true,
        vec![Fixed::new("S", Status::Skipped), Fixed::new("P", Status::Pass)],
    ));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(outcome.ok);
    assert_eq!(outcome.results[0].status, Status::Skipped);
}

// --- Crash containment ---

#[test]
fn panic_becomes_a_fail_result_and_siblings_run() {
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "mixed",
        true,
        vec![Arc::new(Panicky) as Arc<dyn Check>, Fixed::new("P", Status::Pass)],
    ));

    let outcome = run_pipeline(&config, &ctx(), 4);
    assert!(!outcome.ok);
    assert_eq!(outcome.results.len(), 2);

    let crashed = &outcome.results[0];
    assert_eq!(crashed.status, Status::Fail);
    assert_eq!(crashed.findings.len(), 1);
    assert_eq!(crashed.findings[0].code, "pipeline/check-crashed");
    assert!(crashed.findings[0].message.contains("boom in check"));

    assert_eq!(outcome.results[1].status, Status::Pass);
}

#[test]
fn error_return_becomes_a_fail_result() {
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "only",
        false,
        vec![Arc::new(Erroring) as Arc<dyn Check>],
    ));

    let outcome = run_pipeline(&config, &ctx(), 4);
    let crashed = &outcome.results[0];
    assert_eq!(crashed.status, Status::Fail);
    assert!(crashed.findings[0].message.contains("tool output was garbage"));
    assert!(crashed.stderr.is_some());
}

// --- Stamping and worker bounds ---

#[test]
fn scheduler_stamps_stage_and_duration() {
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "stamped",
        false,
        vec![Sleepy::new("S", 20)],
    ));

    let outcome = run_pipeline(&config, &ctx(), 1);
    let result = &outcome.results[0];
    assert_eq!(result.stage.as_deref(), Some("stamped"));
    assert!(result.duration_ms.unwrap_or(0) >= 20);
}

#[test]
fn zero_workers_is_clamped_to_one() {
    let config = ValidatorConfig::empty().with_stage(StageSpec::new(
        "tiny",
        true,
        vec![Fixed::new("A", Status::Pass), Fixed::new("B", Status::Pass)],
    ));

    let outcome = run_pipeline(&config, &ctx(), 0);
    assert!(outcome.ok);
    assert_eq!(names(&outcome.results), vec!["A", "B"]);
}

#[test]
fn worker_ceiling_is_eight() {
    assert_eq!(MAX_WORKERS, 8);
}
