//! External agent invocation.
//!
//! Agents are black-box executables: invoked with a role id, a prompt, and a
//! timeout, they print their answer to stdout and signal failure through the
//! exit code. This module owns the one place that contract is enforced.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::errors::AgentError;
use crate::phase::AgentRole;

/// Extra time granted past the agent's own timeout before the invocation is
/// declared hung. The child enforces its deadline itself; the grace period
/// distinguishes "agent exited at its deadline" from "invocation machinery
/// hung".
pub const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Spawns agent processes and maps their outcome into `AgentError`.
pub struct AgentInvoker {
    agent_cmd: String,
    workspace: Option<PathBuf>,
    grace: Duration,
}

impl AgentInvoker {
    pub fn new(agent_cmd: impl Into<String>, workspace: Option<PathBuf>) -> Self {
        Self {
            agent_cmd: agent_cmd.into(),
            workspace,
            grace: GRACE_PERIOD,
        }
    }

    /// Override the hang grace period. Tests use this to avoid 30s waits.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Invoke an agent and block until it exits or the timeout (plus grace)
    /// elapses.
    ///
    /// - exit 0: `Ok` with stdout, verbatim
    /// - non-zero exit: `NonZeroExit` carrying stderr (or "unknown error")
    /// - deadline passed: `Timeout`; the child is killed, partial output is
    ///   never surfaced as success
    /// - spawn failure: `InvocationFailed`
    ///
    /// No retries happen here; retry policy, if any, belongs to the caller.
    pub async fn invoke(
        &self,
        role: AgentRole,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, AgentError> {
        let timeout_secs = timeout.as_secs();

        let mut cmd = Command::new(&self.agent_cmd);
        cmd.arg("agent")
            .arg("--agent")
            .arg(role.id())
            .arg("--message")
            .arg(prompt)
            .arg("--timeout")
            .arg(timeout_secs.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.workspace {
            cmd.current_dir(dir);
        }

        debug!(agent = role.id(), timeout_secs, "spawning agent process");

        let child = cmd.spawn().map_err(|source| AgentError::InvocationFailed {
            agent: role.id().to_string(),
            source,
        })?;

        let output = match tokio::time::timeout(timeout + self.grace, child.wait_with_output())
            .await
        {
            Ok(result) => result.map_err(|source| AgentError::InvocationFailed {
                agent: role.id().to_string(),
                source,
            })?,
            Err(_) => {
                // Dropping the wait future kills the child (kill_on_drop).
                return Err(AgentError::Timeout {
                    agent: role.id().to_string(),
                    timeout_secs,
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(agent = role.id(), exit_code, "agent process exited");

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(AgentError::NonZeroExit {
            agent: role.id().to_string(),
            exit_code,
            stderr: if stderr.is_empty() {
                "unknown error".to_string()
            } else {
                stderr
            },
        })
    }
}
