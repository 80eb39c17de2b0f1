//! Node manager error types.

use std::process::ExitStatus;

use thiserror::Error;

/// Errors surfaced by node lifecycle operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// An invocation parameter was missing or would corrupt the argument
    /// list. Always a caller bug; never retried.
    #[error("invalid {parameter} parameter: {reason}")]
    Template {
        parameter: &'static str,
        reason: String,
    },

    /// The hypervisor CLI could not be started at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The hypervisor CLI exited non-zero.
    #[error("{program} exited with {status}: {stderr}")]
    Process {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The presence check for a node failed.
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("hypervisor output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type NodeResult<T> = Result<T, NodeError>;
