//! Phase and workflow-plan definitions.
//!
//! This module provides:
//! - `AgentRole` and `PhaseStatus` enums shared with the ledger
//! - `PhaseKind`, the five canonical workflow steps and their agent bindings
//! - `PhaseSpec`, one fully-resolved step (prompt and timeout included)
//! - `assemble_workflow`, a pure function from a `WorkflowPlan` to the
//!   ordered phase list — the orchestrator itself has no skip logic

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::prompt::{self, PromptContext};

/// Agent roles known to the workflow.
///
/// The serialized form is the role identifier handed to the external agent
/// command, so the ledger stays human-diffable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    ProductManager,
    Architect,
    SoftwareEngineer,
    Tester,
    UiDesigner,
}

impl AgentRole {
    /// Identifier passed to the external agent command (`--agent <id>`).
    pub fn id(&self) -> &'static str {
        match self {
            Self::ProductManager => "product-manager",
            Self::Architect => "architect",
            Self::SoftwareEngineer => "software-engineer",
            Self::Tester => "tester",
            Self::UiDesigner => "ui-designer",
        }
    }

    /// Human-readable name for console output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ProductManager => "Product Manager",
            Self::Architect => "Architect",
            Self::SoftwareEngineer => "Software Engineer",
            Self::Tester => "Test Engineer",
            Self::UiDesigner => "UI Designer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Execution status of a single phase.
///
/// `Pending` is implicit — a phase with no ledger record has never run — but
/// the variant exists so status displays don't invent a fourth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl PhaseStatus {
    /// Check if this status ends a phase attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The five canonical workflow steps, each bound to exactly one agent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    PmAnalysis,
    Architecture,
    UiDesign,
    Implementation,
    Testing,
}

/// Default timeout handed to analysis-style agents.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(300);

/// Implementation agents read and write real code; they get longer.
pub const IMPLEMENTATION_TIMEOUT: Duration = Duration::from_secs(900);

impl PhaseKind {
    /// Stable ledger key for this phase.
    pub fn phase_id(&self) -> &'static str {
        match self {
            Self::PmAnalysis => "pm_analysis",
            Self::Architecture => "architecture",
            Self::UiDesign => "ui_design",
            Self::Implementation => "implementation",
            Self::Testing => "testing",
        }
    }

    /// The agent role that executes this phase.
    pub fn role(&self) -> AgentRole {
        match self {
            Self::PmAnalysis => AgentRole::ProductManager,
            Self::Architecture => AgentRole::Architect,
            Self::UiDesign => AgentRole::UiDesigner,
            Self::Implementation => AgentRole::SoftwareEngineer,
            Self::Testing => AgentRole::Tester,
        }
    }

    /// Human-readable step name for console output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PmAnalysis => "Requirement analysis",
            Self::Architecture => "Architecture design",
            Self::UiDesign => "UI design",
            Self::Implementation => "Implementation",
            Self::Testing => "Test writing",
        }
    }

    /// Per-phase agent timeout.
    pub fn timeout(&self) -> Duration {
        match self {
            Self::Implementation => IMPLEMENTATION_TIMEOUT,
            _ => ANALYSIS_TIMEOUT,
        }
    }

    /// Resolve this kind into a runnable spec for the given project and task.
    pub fn spec(&self, ctx: &PromptContext<'_>) -> PhaseSpec {
        PhaseSpec {
            phase_id: self.phase_id().to_string(),
            role: self.role(),
            display_name: self.display_name().to_string(),
            prompt: prompt::build(*self, ctx),
            timeout: self.timeout(),
        }
    }
}

/// One fully-resolved step of the development workflow.
///
/// The prompt is opaque here: the orchestrator passes it through to the
/// agent without inspecting it.
#[derive(Debug, Clone)]
pub struct PhaseSpec {
    pub phase_id: String,
    pub role: AgentRole,
    pub display_name: String,
    pub prompt: String,
    pub timeout: Duration,
}

/// Which optional phases a full workflow run leaves out.
///
/// Requirement analysis and architecture always run; the rest are opt-out,
/// mirroring the CLI's `--skip-*` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowPlan {
    pub skip_ui: bool,
    pub skip_code: bool,
    pub skip_test: bool,
}

/// Build the ordered phase list for a full workflow run.
///
/// Pure selection policy: callers decide what to skip, the orchestrator only
/// ever sees the resulting list.
pub fn assemble_workflow(plan: &WorkflowPlan) -> Vec<PhaseKind> {
    let mut kinds = vec![PhaseKind::PmAnalysis, PhaseKind::Architecture];
    if !plan.skip_ui {
        kinds.push(PhaseKind::UiDesign);
    }
    if !plan.skip_code {
        kinds.push(PhaseKind::Implementation);
    }
    if !plan.skip_test {
        kinds.push(PhaseKind::Testing);
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_match_agent_command_contract() {
        assert_eq!(AgentRole::ProductManager.id(), "product-manager");
        assert_eq!(AgentRole::Architect.id(), "architect");
        assert_eq!(AgentRole::SoftwareEngineer.id(), "software-engineer");
        assert_eq!(AgentRole::Tester.id(), "tester");
        assert_eq!(AgentRole::UiDesigner.id(), "ui-designer");
    }

    #[test]
    fn test_role_serializes_as_kebab_case_id() {
        let json = serde_json::to_string(&AgentRole::SoftwareEngineer).unwrap();
        assert_eq!(json, "\"software-engineer\"");
        let parsed: AgentRole = serde_json::from_str("\"ui-designer\"").unwrap();
        assert_eq!(parsed, AgentRole::UiDesigner);
    }

    #[test]
    fn test_status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&PhaseStatus::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: PhaseStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, PhaseStatus::Failed);
    }

    #[test]
    fn test_status_terminality() {
        assert!(PhaseStatus::Completed.is_terminal());
        assert!(PhaseStatus::Failed.is_terminal());
        assert!(!PhaseStatus::Running.is_terminal());
        assert!(!PhaseStatus::Pending.is_terminal());
    }

    #[test]
    fn test_phase_kind_bindings() {
        assert_eq!(PhaseKind::PmAnalysis.phase_id(), "pm_analysis");
        assert_eq!(PhaseKind::PmAnalysis.role(), AgentRole::ProductManager);
        assert_eq!(PhaseKind::Implementation.role(), AgentRole::SoftwareEngineer);
        assert_eq!(PhaseKind::Testing.phase_id(), "testing");
    }

    #[test]
    fn test_implementation_gets_longer_timeout() {
        assert_eq!(PhaseKind::Implementation.timeout(), IMPLEMENTATION_TIMEOUT);
        assert_eq!(PhaseKind::Architecture.timeout(), ANALYSIS_TIMEOUT);
        assert!(IMPLEMENTATION_TIMEOUT > ANALYSIS_TIMEOUT);
    }

    #[test]
    fn test_assemble_workflow_full() {
        let kinds = assemble_workflow(&WorkflowPlan::default());
        assert_eq!(
            kinds,
            vec![
                PhaseKind::PmAnalysis,
                PhaseKind::Architecture,
                PhaseKind::UiDesign,
                PhaseKind::Implementation,
                PhaseKind::Testing,
            ]
        );
    }

    #[test]
    fn test_assemble_workflow_skips_are_independent() {
        let kinds = assemble_workflow(&WorkflowPlan {
            skip_ui: true,
            skip_code: false,
            skip_test: true,
        });
        assert_eq!(
            kinds,
            vec![
                PhaseKind::PmAnalysis,
                PhaseKind::Architecture,
                PhaseKind::Implementation,
            ]
        );
    }

    #[test]
    fn test_assemble_workflow_minimum_is_analysis_plus_architecture() {
        let kinds = assemble_workflow(&WorkflowPlan {
            skip_ui: true,
            skip_code: true,
            skip_test: true,
        });
        assert_eq!(kinds, vec![PhaseKind::PmAnalysis, PhaseKind::Architecture]);
    }

    #[test]
    fn test_spec_resolution_carries_prompt_and_timeout() {
        let ctx = PromptContext {
            project: "castmind",
            project_path: "~/Projects/castmind",
            task: "implement user login",
        };
        let spec = PhaseKind::Implementation.spec(&ctx);
        assert_eq!(spec.phase_id, "implementation");
        assert_eq!(spec.role, AgentRole::SoftwareEngineer);
        assert_eq!(spec.timeout, IMPLEMENTATION_TIMEOUT);
        assert!(spec.prompt.contains("castmind"));
        assert!(spec.prompt.contains("implement user login"));
    }
}
