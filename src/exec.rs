use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ExecResult {
    /// Diagnostic text for a failed run: stdout if the tool wrote any, else stderr.
    pub fn diagnostics(&self) -> String {
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        format!("exit code {}", self.exit_code)
    }
}

/// Spawns an external tool and captures its output.
///
/// Implementations must not treat a non-zero exit as an error: callers inspect
/// `exit_code` themselves. `Err` means the tool never started or did not finish
/// within `timeout`; in the latter case it must no longer be running.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<ExecResult>;
}

/// Runs tools from the host PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<ExecResult> {
        if let Err(e) = which::which(program) {
            tracing::warn!(program, "not found on PATH");
            return Err(e).with_context(|| format!("{program} not found on PATH"));
        }
        run_cmd_with_timeout(program, args, timeout).await
    }
}

/// Run a command and return the result regardless of exit code.
///
/// The child leads its own process group. On timeout the whole group is killed,
/// so helpers a wrapper shell forked die with it.
pub async fn run_cmd_with_timeout(
    cmd: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<ExecResult> {
    let start = Instant::now();
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let child = command
        .spawn()
        .with_context(|| format!("failed to execute {cmd}"))?;
    let pid = child.id();

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output.with_context(|| format!("failed to wait for {cmd}"))?,
        Err(_) => {
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            tracing::warn!(cmd, pid, "command timed out, killed");
            anyhow::bail!("{cmd} timed out after {}s", timeout.as_secs_f64());
        }
    };

    let result = ExecResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration: start.elapsed(),
    };
    tracing::debug!(
        cmd,
        args = %args.join(" "),
        exit_code = result.exit_code,
        elapsed_ms = result.duration.as_millis() as u64,
        "command finished"
    );
    Ok(result)
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let target = format!("-{pgid}");
    match std::process::Command::new("kill")
        .args(["-KILL", "--", target.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::debug!(pgid, ?status, "kill reported no process group"),
        Err(e) => tracing::warn!(pgid, "failed to run kill: {e}"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}
