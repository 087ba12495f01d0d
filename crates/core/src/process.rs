//! Process execution utilities
//!
//! Provides a unified interface for running external commands with:
//! - Output capture
//! - Directory context
//! - An upper-bound timeout after which the child is killed

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Wall-clock time the command took
    pub duration: Duration,
}

impl CommandResult {
    fn from_parts(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
            duration,
        }
    }

    /// Get combined output (stdout + stderr)
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Run a command in `dir`, killing it if it outlives `timeout`.
///
/// Output goes to anonymous temp files rather than pipes, so a child that
/// writes more than a pipe buffer never stalls while we poll it.
pub fn run_with_timeout(
    program: &str,
    args: &[String],
    dir: &Path,
    timeout: Duration,
) -> Result<CommandResult> {
    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let start = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::command_not_found(program).with_source(e)
            } else {
                Error::process(format!("Failed to execute {program}: {e}")).with_source(e)
            }
        })?;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    tracing::warn!(program, timeout_secs = timeout.as_secs(), "killing timed out command");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::timeout(program, timeout.as_secs()));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                return Err(Error::process(format!("Failed to wait for {program}: {e}")).with_source(e));
            }
        }
    };

    let stdout = read_capture(&mut stdout_file)?;
    let stderr = read_capture(&mut stderr_file)?;
    Ok(CommandResult::from_parts(status, stdout, stderr, start.elapsed()))
}

fn read_capture(file: &mut std::fs::File) -> Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Check if a command exists in PATH
#[must_use]
pub fn command_exists(program: &str) -> bool {
    which_command(program).is_some()
}

/// Get the path to a command
#[must_use]
pub fn which_command(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
