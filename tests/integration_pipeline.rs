// tests/integration_pipeline.rs
//! End-to-end runs through the driver: context assembly, scheduling,
//! aggregation, and reporting against real fixture repositories.

use anyhow::Result;
use hex_validate::checks::external::ToolCheck;
use hex_validate::config::{ReportFormat, RunOptions, Scope, StageSpec, ValidatorConfig};
use hex_validate::context::{Check, CheckContext};
use hex_validate::driver;
use hex_validate::types::{CheckResult, Finding};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// A repository root the workspace locator will settle on.
fn repo() -> TempDir {
    let d = tempfile::tempdir().unwrap();
    fs::write(d.path().join("package.json"), "{\"name\":\"fixture\"}").unwrap();
    d
}

fn options(d: &TempDir, report: ReportFormat) -> RunOptions {
    RunOptions {
        scope: Scope::Full,
        report,
        cwd: Some(d.path().to_path_buf()),
        ..RunOptions::default()
    }
}

/// Skips when it sees no TypeScript sources, like a real rule would.
struct IdleWithoutFiles;

impl Check for IdleWithoutFiles {
    fn name(&self) -> &str {
        "Idle"
    }

    fn run(&self, ctx: &CheckContext) -> Result<CheckResult> {
        if ctx.files_with_extension(&["ts"]).is_empty() {
            return Ok(CheckResult::skipped(self.name(), "no files"));
        }
        Ok(CheckResult::pass(self.name()))
    }
}

struct Demo;

impl Check for Demo {
    fn run(&self, _ctx: &CheckContext) -> Result<CheckResult> {
        Ok(CheckResult::from_findings(
            self.name(),
            vec![Finding::error("demo/x", "bad").in_file("src/a.ts").at_line(3)],
        ))
    }

    fn name(&self) -> &str {
        "Demo"
    }
}

fn single_stage(check: Arc<dyn Check>) -> ValidatorConfig {
    ValidatorConfig::empty().with_stage(StageSpec::new("main", false, vec![check]))
}

#[test]
fn empty_repository_full_scope_is_ok_and_skipped() {
    let d = repo();
    let config = single_stage(Arc::new(IdleWithoutFiles));

    let (ok, out) = driver::execute(&config, &options(&d, ReportFormat::Summary)).unwrap();
    assert!(ok);
    assert!(out.contains("Tasks: 1"));
    assert!(out.contains("Skipped: 1"));

    let (ok, out) = driver::execute(&config, &options(&d, ReportFormat::Json)).unwrap();
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["results"][0]["status"], "skipped");
}

#[test]
fn single_error_finding_fails_the_run() {
    let d = repo();
    let config = single_stage(Arc::new(Demo));

    let (ok, out) = driver::execute(&config, &options(&d, ReportFormat::Json)).unwrap();
    assert!(!ok);

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["results"][0]["status"], "fail");
    assert_eq!(json["results"][0]["messages"][0]["line"], 3);
    assert_eq!(json["results"][0]["messages"][0]["file"], "src/a.ts");
}

#[test]
fn aborted_stage_never_reaches_later_stage_names() {
    let d = repo();
    let config = ValidatorConfig::empty()
        .with_stage(StageSpec::new("first", false, vec![Arc::new(Demo) as Arc<dyn Check>]))
        .with_stage(StageSpec::new(
            "unreachable-stage",
            false,
            vec![Arc::new(IdleWithoutFiles) as Arc<dyn Check>],
        ));

    let (ok, out) = driver::execute(&config, &options(&d, ReportFormat::Summary)).unwrap();
    assert!(!ok);
    assert!(out.contains("Tasks: 1"));
    assert!(!out.contains("unreachable-stage"));
}

#[test]
fn missing_tool_skips_and_the_run_stays_ok() {
    let d = repo();
    let acme = ToolCheck::new("Acme", "acme", &["--lint"], "install acme from acme.dev");
    let config = single_stage(Arc::new(acme));

    let (ok, out) = driver::execute(&config, &options(&d, ReportFormat::Json)).unwrap();
    assert!(ok, "a missing tool must never fail the pipeline");

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["results"][0]["status"], "skipped");
    let note = json["results"][0]["stdout"].as_str().unwrap();
    assert!(note.contains("acme not found"));
}

#[test]
fn explicit_paths_become_the_target_scope() {
    let d = repo();
    fs::create_dir_all(d.path().join("src")).unwrap();
    fs::write(d.path().join("src/a.ts"), "export const a = 1;\n").unwrap();
    fs::write(d.path().join("src/b.md"), "# notes\n").unwrap();

    let config = single_stage(Arc::new(IdleWithoutFiles));
    let opts = RunOptions {
        paths: Some(vec!["src".into()]),
        ..options(&d, ReportFormat::Json)
    };

    let (ok, out) = driver::execute(&config, &opts).unwrap();
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    // The .ts file is inside the target set, so the check found work.
    assert_eq!(json["results"][0]["status"], "pass");
}

#[test]
fn unusable_cwd_is_a_pre_run_fatal() {
    let config = single_stage(Arc::new(IdleWithoutFiles));
    let opts = RunOptions {
        cwd: Some("/no/such/directory/anywhere".into()),
        ..RunOptions::default()
    };
    assert!(driver::execute(&config, &opts).is_err());
}

#[test]
fn junit_report_renders_from_the_driver() {
    let d = repo();
    let config = single_stage(Arc::new(Demo));

    let (_, out) = driver::execute(&config, &options(&d, ReportFormat::Junit)).unwrap();
    assert!(out.contains(r#"<testsuite name="hex-validator" tests="1" failures="1">"#));
    assert!(out.contains(r#"<testcase name="Demo""#));
}
