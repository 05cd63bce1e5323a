//! Child-process invocation shared by the tool adapters.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use mucher_core::error::MucherError;

/// Captured result of a finished tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr, for logs and error messages.
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Run `program` in `cwd`, feed it `stdin`, and wait for it to exit.
///
/// A non-zero exit status is not an error here; callers decide.
pub async fn run_tool(
    program: &str,
    args: &[&str],
    stdin: Option<&[u8]>,
    cwd: &Path,
    deadline: Option<Duration>,
) -> Result<ToolOutput, MucherError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MucherError::ToolNotFound {
            tool: program.to_string(),
        },
        _ => MucherError::ToolFailed {
            tool: program.to_string(),
            status: "not started".into(),
            output: e.to_string(),
        },
    })?;
    tracing::debug!("started {program} {}", args.join(" "));

    if let (Some(bytes), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // A tool that exits without reading its input closes the pipe early.
        if let Err(e) = pipe.write_all(bytes).await {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                tracing::warn!("failed to write stdin of {program}: {e}");
            }
        }
        drop(pipe);
    }

    let waited = match deadline {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| MucherError::ToolTimedOut {
                tool: program.to_string(),
                secs: limit.as_secs(),
            })?,
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| MucherError::ToolFailed {
        tool: program.to_string(),
        status: "wait failed".into(),
        output: e.to_string(),
    })?;

    let result = ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!("{program} exited with {}", result.status);
    Ok(result)
}
