// tests/unit_probe.rs
use hex_validate::probe::{probe, probe_with_args};
use tempfile::TempDir;

fn tmp() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn missing_tool_is_unavailable_not_an_error() {
    let d = tmp();
    let info = probe("hex-validate-no-such-tool", d.path());
    assert!(!info.available);
    assert_eq!(info.version, None);
    assert_eq!(info.path, None);
}

#[test]
fn nonzero_exit_is_unavailable() {
    let d = tmp();
    let info = probe_with_args("sh", &["-c", "echo v9.9.9; exit 1"], d.path());
    assert!(!info.available);
}

#[test]
fn version_is_parsed_from_stdout() {
    let d = tmp();
    let info = probe_with_args("sh", &["-c", "echo tool v2.14.3"], d.path());
    assert!(info.available);
    assert_eq!(info.version.as_deref(), Some("2.14.3"));
}

#[test]
fn stderr_is_consulted_when_stdout_is_silent() {
    let d = tmp();
    let info = probe_with_args("sh", &["-c", "echo 1.2.3 1>&2"], d.path());
    assert!(info.available);
    assert_eq!(info.version.as_deref(), Some("1.2.3"));
}

#[test]
fn results_are_memoized_per_command_and_cwd() {
    let d = tmp();
    // First probe succeeds and is recorded under ("sh", cwd)...
    let first = probe_with_args("sh", &["-c", "echo v1.0.0"], d.path());
    assert!(first.available);
    // ...so a later probe of the same key returns the memo even though
    // this argument vector would fail.
    let second = probe_with_args("sh", &["-c", "exit 1"], d.path());
    assert!(second.available);
    assert_eq!(second.version, first.version);
}
