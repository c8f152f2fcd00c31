//! Runtime configuration for devcrew.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for one devcrew invocation.
///
/// Bridges CLI flags with environment fallbacks and derives the paths the
/// rest of the system uses. The project path is a label handed to agents and
/// is not validated for existence.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project name: ledger key and label passed to agents.
    pub project: String,
    /// Where the project is said to live (defaults to `~/Projects/<name>`).
    pub project_path: PathBuf,
    /// Root for devcrew's own files; the ledger lives here.
    pub artifacts_dir: PathBuf,
    /// External agent command, e.g. `openclaw`.
    pub agent_cmd: String,
    /// Working directory handed to spawned agents, when one exists.
    pub agent_workspace: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    pub fn new(project: String, project_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let home = dirs::home_dir().context("Failed to resolve home directory")?;

        let project_path = project_path.unwrap_or_else(|| home.join("Projects").join(&project));

        let artifacts_dir = std::env::var("DEVCREW_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".devcrew"));

        let agent_cmd =
            std::env::var("DEVCREW_AGENT_CMD").unwrap_or_else(|_| "openclaw".to_string());

        // Agents run inside their own workspace when one exists; otherwise
        // they inherit the orchestrator's working directory.
        let agent_workspace = std::env::var("DEVCREW_AGENT_WORKSPACE")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let default = home.join(".openclaw").join("workspace");
                default.exists().then_some(default)
            });

        Ok(Self {
            project,
            project_path,
            artifacts_dir,
            agent_cmd,
            agent_workspace,
            verbose,
        })
    }

    /// Backing store for the status ledger, derived from the project name.
    pub fn ledger_path(&self) -> PathBuf {
        self.artifacts_dir
            .join(format!("{}_tasks.json", self.project))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.artifacts_dir)
            .context("Failed to create artifacts directory")?;
        Ok(())
    }
}
