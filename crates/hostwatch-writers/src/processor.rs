// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External JSON post-processor invocation.
//!
//! The processor is a shell command line. It receives the aggregated reader
//! data as JSON on stdin and must print the transformed JSON on stdout.

use std::process::Stdio;
use std::time::Duration;

use hostwatch_core::{HostwatchError, ReadersData};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Pipes `readers_data` through `command` and parses its output.
///
/// The child is killed if it outlives `timeout`. Only the `sh` process is
/// killed; programs it started in a pipeline (`a | b`) may keep running. A
/// non-zero exit status is a failure even when stdout holds valid JSON.
pub async fn run_json_processor(
    command: &str,
    readers_data: &ReadersData,
    timeout: Duration,
) -> Result<serde_json::Value, HostwatchError> {
    let input = serde_json::to_vec(readers_data).map_err(|e| HostwatchError::Pipeline {
        message: format!("failed to serialize readers data: {e}"),
        source: Some(Box::new(e)),
    })?;

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HostwatchError::Pipeline {
            message: format!("failed to spawn json processor `{command}`: {e}"),
            source: Some(Box::new(e)),
        })?;

    // Feed stdin from its own task so a processor that writes before it has
    // read everything cannot deadlock against us.
    let stdin_task = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&input).await {
                debug!(error = %e, "json processor closed stdin early");
            }
        })
    });

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| HostwatchError::Pipeline {
            message: format!("json processor `{command}` timed out after {timeout:?}"),
            source: None,
        })?
        .map_err(|e| HostwatchError::Pipeline {
            message: format!("failed to capture json processor output: {e}"),
            source: Some(Box::new(e)),
        })?;

    if let Some(task) = stdin_task {
        if let Err(e) = task.await {
            debug!(error = %e, "json processor stdin feeder did not finish");
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output.status.code().unwrap_or(-1);
        warn!(command = %command, code, stderr = %stderr.trim(), "json processor failed");
        return Err(HostwatchError::pipeline(format!(
            "json processor `{command}` exited with code {code}: {}",
            stderr.trim()
        )));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| HostwatchError::Pipeline {
        message: format!("json processor `{command}` produced invalid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}
