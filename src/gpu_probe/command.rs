// External tool invocation with a hard timeout.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::ProbeError;

/// Runs `program args...` and returns its stdout. The child is killed if it outlives `timeout`.
pub(crate) async fn run_with_timeout(
    program: &'static str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ProbeError> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, output)
        .await
        .map_err(|_| ProbeError::Timeout { program, timeout })?
        .map_err(|source| ProbeError::Spawn { program, source })?;

    if !output.status.success() {
        return Err(ProbeError::Exit {
            program,
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
