//! External process execution.
//!
//! Two modes, matching what callers need from the hypervisor CLI:
//! [`run_streaming`] inherits the parent's stdout/stderr so long-running
//! operations stay visible, while [`run_captured`] collects stdout for
//! parsing. Both wait for the child; concurrency is the caller's concern.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::command::Invocation;
use crate::error::{NodeError, NodeResult};

/// Run to completion with inherited stdout/stderr.
pub async fn run_streaming(invocation: &Invocation) -> NodeResult<()> {
    debug!(command = %invocation.command_line(), "running");

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| NodeError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

    let status = child.wait().await.map_err(|source| NodeError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(NodeError::Process {
            program: invocation.program.clone(),
            status,
            stderr: String::new(),
        });
    }
    Ok(())
}

/// Run to completion, returning captured stdout. On failure the captured
/// stderr rides along in the error.
pub async fn run_captured(invocation: &Invocation) -> NodeResult<String> {
    debug!(command = %invocation.command_line(), "running (captured)");

    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| NodeError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(NodeError::Process {
            program: invocation.program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    if !output.stderr.is_empty() {
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "hypervisor wrote to stderr on success"
        );
    }

    Ok(String::from_utf8(output.stdout)?)
}
