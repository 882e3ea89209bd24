// tests/unit_process.rs
use hex_validate::process::run;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn tmp() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn captures_stdout_and_reports_success() {
    let d = tmp();
    let out = run("sh", &["-c", "echo hello"], d.path(), None).unwrap();
    assert!(out.success());
    assert_eq!(out.stdout, "hello\n");
    assert_eq!(out.stderr, "");
}

#[test]
fn reports_the_raw_exit_code() {
    let d = tmp();
    let out = run("sh", &["-c", "exit 3"], d.path(), None).unwrap();
    assert_eq!(out.exit_code, 3);
    assert!(!out.success());
}

#[test]
fn captures_both_streams_independently() {
    let d = tmp();
    let out = run("sh", &["-c", "echo out; echo err 1>&2"], d.path(), None).unwrap();
    assert_eq!(out.stdout, "out\n");
    assert_eq!(out.stderr, "err\n");
}

#[test]
fn large_output_on_both_pipes_does_not_deadlock() {
    let d = tmp();
    // Well past a pipe buffer on either stream.
    let script = "i=0; while [ $i -lt 4000 ]; do echo 0123456789012345678901234567890123456789; echo e0123456789012345678901234567890123456789 1>&2; i=$((i+1)); done";
    let out = run("sh", &["-c", script], d.path(), None).unwrap();
    assert!(out.success());
    assert_eq!(out.stdout.lines().count(), 4000);
    assert_eq!(out.stderr.lines().count(), 4000);
}

#[test]
fn spawn_failure_is_an_error() {
    let d = tmp();
    assert!(run("hex-validate-no-such-binary", &[], d.path(), None).is_err());
}

#[test]
fn timeout_kills_the_child() {
    let d = tmp();
    let start = Instant::now();
    let result = run(
        "sh",
        &["-c", "sleep 30"],
        d.path(),
        Some(Duration::from_millis(200)),
    );
    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn runs_in_the_given_working_directory() {
    let d = tmp();
    std::fs::write(d.path().join("marker"), "x").unwrap();
    let out = run("sh", &["-c", "ls"], d.path(), None).unwrap();
    assert!(out.stdout.contains("marker"));
}
