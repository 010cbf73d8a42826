//! Scheduler subprocess plumbing.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use stagehand_protocols::error::JobError;

/// Outcome of a finished scheduler command.
#[derive(Debug)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Run one scheduler command to completion, bounded by `timeout_secs`.
///
/// A nonzero exit is a normal [`CommandOutput`]; only failing to spawn or
/// exceeding the time budget is an error.
pub async fn run(program: &str, args: &[String], timeout_secs: u64) -> Result<CommandOutput, JobError> {
    tracing::debug!(program, ?args, "running scheduler command");

    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

    let output = timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| JobError::Timeout(timeout_secs))?
        .map_err(|e| JobError::Spawn(format!("{program}: {e}")))?;

    let result = CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !result.success() {
        tracing::warn!(program, code = result.code, stderr = %result.stderr.trim(),
            "scheduler command exited nonzero");
    }
    Ok(result)
}
