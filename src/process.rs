// src/process.rs
//! Subprocess execution with full output capture.
//!
//! Both pipes are drained on dedicated threads so a chatty child can never
//! deadlock on backpressure. The engine never inherits a child's streams.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured outcome of a finished child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Raw OS exit code; 1 when the process exited abnormally without one.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Spawns `program` with stdin closed and both output streams piped, and
/// waits for it to finish. There is no timeout unless the caller supplies
/// one; on expiry the child is killed and an error returned.
///
/// # Errors
/// Returns error if the program cannot be spawned or the timeout expires.
pub fn run(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn `{program}`"))?;

    let out_thread = child.stdout.take().map(drain);
    let err_thread = child.stderr.take().map(drain);

    let status = wait(&mut child, program, timeout);

    let stdout = out_thread.map(join_drained).unwrap_or_default();
    let stderr = err_thread.map(join_drained).unwrap_or_default();
    let status = status?;

    Ok(ProcessOutput {
        exit_code: status.code().unwrap_or(1),
        stdout,
        stderr,
    })
}

fn wait(child: &mut Child, program: &str, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(limit) = timeout else {
        return child.wait().context("wait failed");
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("wait failed")? {
            return Ok(status);
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            bail!("`{program}` timed out after {limit:?}");
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

fn join_drained(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
