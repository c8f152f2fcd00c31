//! Typed error hierarchy for the devcrew orchestrator.
//!
//! Two top-level enums cover the two subsystems:
//! - `AgentError` — external agent invocation failures
//! - `LedgerError` — status-ledger persistence failures

use std::path::PathBuf;
use thiserror::Error;

/// Errors from invoking an external agent process.
///
/// Callers branch on the variant, never on message text: a timed-out agent,
/// a cleanly failing agent, and a broken invocation are different situations
/// with different ledger consequences.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent '{agent}' timed out after {timeout_secs}s")]
    Timeout { agent: String, timeout_secs: u64 },

    #[error("Agent '{agent}' exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        agent: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to invoke agent '{agent}': {source}")]
    InvocationFailed {
        agent: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from reading or writing the status ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to read ledger at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write ledger at {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Ledger at {path} exists but is not valid JSON: {source}. \
         Refusing to discard recorded history; run 'devcrew reset --force' to start over"
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
