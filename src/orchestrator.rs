//! Sequential phase orchestration.
//!
//! Drives each phase through running → completed|failed, recording every
//! transition in the ledger. Agent failures become `failed` records and
//! printed diagnostics; only ledger failures abort a run, because losing
//! status history would defeat the point of keeping one.

use console::style;
use tracing::warn;

use crate::agent::AgentInvoker;
use crate::errors::{AgentError, LedgerError};
use crate::ledger::Ledger;
use crate::phase::{PhaseSpec, PhaseStatus};

/// Result of one phase attempt.
///
/// `result` carries the full agent output or error; the ledger stores only
/// the truncated form.
#[derive(Debug)]
pub struct PhaseOutcome {
    pub phase_id: String,
    pub display_name: String,
    pub result: Result<String, AgentError>,
}

impl PhaseOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn status(&self) -> PhaseStatus {
        if self.succeeded() {
            PhaseStatus::Completed
        } else {
            PhaseStatus::Failed
        }
    }
}

/// Summary of one workflow invocation: every attempted phase, in order.
#[derive(Debug, Default)]
pub struct WorkflowOutcome {
    pub outcomes: Vec<PhaseOutcome>,
}

impl WorkflowOutcome {
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}

/// Runs phases for one project against one invoker and one ledger.
pub struct Orchestrator {
    project: String,
    invoker: AgentInvoker,
    ledger: Ledger,
}

impl Orchestrator {
    pub fn new(project: impl Into<String>, invoker: AgentInvoker, ledger: Ledger) -> Self {
        Self {
            project: project.into(),
            invoker,
            ledger,
        }
    }

    /// Drive one phase through the state machine:
    ///
    /// ```text
    /// pending --(start)----------------> running
    /// running --(invoker returns Ok)---> completed
    /// running --(invoker returns Err)--> failed
    /// ```
    ///
    /// `pending` is implicit (no record yet). Re-running a phase id starts
    /// again from `running`, overwriting the previous terminal record. No
    /// retries, no rollback.
    pub async fn run_phase(&self, spec: &PhaseSpec) -> Result<PhaseOutcome, LedgerError> {
        println!();
        println!(
            "{} {} ({})",
            style("==>").cyan().bold(),
            spec.display_name,
            spec.role.display_name()
        );

        self.ledger.record(
            &self.project,
            &spec.phase_id,
            spec.role,
            PhaseStatus::Running,
            "",
        )?;

        let result = self
            .invoker
            .invoke(spec.role, &spec.prompt, spec.timeout)
            .await;

        match &result {
            Ok(output) => {
                self.ledger.record(
                    &self.project,
                    &spec.phase_id,
                    spec.role,
                    PhaseStatus::Completed,
                    output,
                )?;
                println!("{output}");
                println!("{} {} completed", style("✓").green().bold(), spec.display_name);
            }
            Err(err) => {
                warn!(phase = %spec.phase_id, error = %err, "phase failed");
                self.ledger.record(
                    &self.project,
                    &spec.phase_id,
                    spec.role,
                    PhaseStatus::Failed,
                    &err.to_string(),
                )?;
                println!("{} {}: {}", style("✗").red().bold(), spec.display_name, err);
            }
        }

        Ok(PhaseOutcome {
            phase_id: spec.phase_id.clone(),
            display_name: spec.display_name.clone(),
            result,
        })
    }

    /// Run phases strictly in order.
    ///
    /// A failed phase is recorded and reported but does not stop later
    /// phases — a failed test-writing phase should not block the
    /// implementation output that already exists. The outcome lists every
    /// attempted phase.
    pub async fn run_workflow(&self, specs: &[PhaseSpec]) -> Result<WorkflowOutcome, LedgerError> {
        let mut outcomes = Vec::with_capacity(specs.len());
        for spec in specs {
            outcomes.push(self.run_phase(spec).await?);
        }
        Ok(WorkflowOutcome { outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::AgentRole;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::tempdir;

    /// A fake agent that answers normally for every role except `architect`,
    /// which fails with "boom" on stderr.
    const FAKE_AGENT: &str = r#"#!/bin/sh
role=""
while [ $# -gt 0 ]; do
  case "$1" in
    --agent) role="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ "$role" = "architect" ]; then
  echo "boom" >&2
  exit 1
fi
echo "all good from $role"
"#;

    fn create_fake_agent(dir: &Path) -> PathBuf {
        let script_path = dir.join("fake-agent.sh");
        std::fs::write(&script_path, FAKE_AGENT).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&script_path, perms).unwrap();
        }
        script_path
    }

    fn spec_for(phase_id: &str, role: AgentRole) -> PhaseSpec {
        PhaseSpec {
            phase_id: phase_id.to_string(),
            role,
            display_name: phase_id.to_string(),
            prompt: "do the thing".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn make_orchestrator(dir: &Path) -> Orchestrator {
        let script = create_fake_agent(dir);
        let invoker = AgentInvoker::new(script.to_string_lossy().to_string(), None);
        let ledger = Ledger::new(dir.join("demo_tasks.json"));
        Orchestrator::new("demo", invoker, ledger)
    }

    #[tokio::test]
    async fn test_run_phase_success_records_completed() {
        let dir = tempdir().unwrap();
        let orch = make_orchestrator(dir.path());

        let outcome = orch
            .run_phase(&spec_for("pm_analysis", AgentRole::ProductManager))
            .await
            .unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.status(), PhaseStatus::Completed);
        assert_eq!(
            outcome.result.as_deref().unwrap(),
            "all good from product-manager\n"
        );

        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let doc = ledger.load().unwrap();
        let record = &doc["demo"].phases["pm_analysis"];
        assert_eq!(record.status, PhaseStatus::Completed);
        assert!(record.result.contains("all good"));
    }

    #[tokio::test]
    async fn test_run_phase_failure_records_failed_with_stderr() {
        let dir = tempdir().unwrap();
        let orch = make_orchestrator(dir.path());

        let outcome = orch
            .run_phase(&spec_for("architecture", AgentRole::Architect))
            .await
            .unwrap();

        assert!(!outcome.succeeded());
        match outcome.result {
            Err(AgentError::NonZeroExit { ref stderr, .. }) => assert_eq!(stderr, "boom"),
            ref other => panic!("Expected NonZeroExit, got {other:?}"),
        }

        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let doc = ledger.load().unwrap();
        let record = &doc["demo"].phases["architecture"];
        assert_eq!(record.status, PhaseStatus::Failed);
        assert!(record.result.contains("boom"));
    }

    #[tokio::test]
    async fn test_workflow_continues_past_a_failed_phase() {
        let dir = tempdir().unwrap();
        let orch = make_orchestrator(dir.path());

        let specs = vec![
            spec_for("pm_analysis", AgentRole::ProductManager),
            spec_for("architecture", AgentRole::Architect),
            spec_for("testing", AgentRole::Tester),
        ];
        let outcome = orch.run_workflow(&specs).await.unwrap();

        // All three attempted despite the middle one failing.
        assert_eq!(outcome.outcomes.len(), 3);
        assert_eq!(outcome.completed(), 2);
        assert_eq!(outcome.failed(), 1);

        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let doc = ledger.load().unwrap();
        assert_eq!(doc["demo"].phases["pm_analysis"].status, PhaseStatus::Completed);
        assert_eq!(doc["demo"].phases["architecture"].status, PhaseStatus::Failed);
        assert_eq!(doc["demo"].phases["testing"].status, PhaseStatus::Completed);
    }

    #[tokio::test]
    async fn test_rerunning_a_phase_overwrites_terminal_record() {
        let dir = tempdir().unwrap();
        let orch = make_orchestrator(dir.path());

        orch.run_phase(&spec_for("architecture", AgentRole::Architect))
            .await
            .unwrap();
        orch.run_phase(&spec_for("pm_analysis", AgentRole::ProductManager))
            .await
            .unwrap();
        // Second attempt for pm_analysis succeeds again with fresh output.
        orch.run_phase(&spec_for("pm_analysis", AgentRole::ProductManager))
            .await
            .unwrap();

        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let doc = ledger.load().unwrap();
        assert_eq!(doc["demo"].phases.len(), 2);
        assert_eq!(doc["demo"].phases["pm_analysis"].status, PhaseStatus::Completed);
        // The unrelated failed record is preserved.
        assert_eq!(doc["demo"].phases["architecture"].status, PhaseStatus::Failed);
    }

    #[tokio::test]
    async fn test_outcome_keeps_full_output_while_ledger_truncates() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("chatty-agent.sh");
        std::fs::write(
            &script_path,
            "#!/bin/sh\nhead -c 1000 /dev/zero | tr '\\0' 'x'\nexit 0\n",
        )
        .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&script_path, perms).unwrap();
        }

        let invoker = AgentInvoker::new(script_path.to_string_lossy().to_string(), None);
        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let orch = Orchestrator::new("demo", invoker, ledger);

        let outcome = orch
            .run_phase(&spec_for("implementation", AgentRole::SoftwareEngineer))
            .await
            .unwrap();
        assert_eq!(outcome.result.as_deref().unwrap().len(), 1000);

        let ledger = Ledger::new(dir.path().join("demo_tasks.json"));
        let doc = ledger.load().unwrap();
        assert_eq!(
            doc["demo"].phases["implementation"].result.chars().count(),
            500
        );
    }

    #[tokio::test]
    async fn test_ledger_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let script = create_fake_agent(dir.path());
        let invoker = AgentInvoker::new(script.to_string_lossy().to_string(), None);
        // Parent directory does not exist, so every persist fails.
        let ledger = Ledger::new(dir.path().join("missing").join("demo_tasks.json"));
        let orch = Orchestrator::new("demo", invoker, ledger);

        let err = orch
            .run_phase(&spec_for("pm_analysis", AgentRole::ProductManager))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unwritable { .. }));
    }
}
