//! Workflow execution — single phases and the full sequence.

use anyhow::{Context, Result};
use console::style;

use devcrew::agent::AgentInvoker;
use devcrew::config::Config;
use devcrew::ledger::Ledger;
use devcrew::orchestrator::{Orchestrator, WorkflowOutcome};
use devcrew::phase::{PhaseKind, WorkflowPlan, assemble_workflow};
use devcrew::prompt::PromptContext;

fn build_orchestrator(config: &Config) -> Orchestrator {
    let invoker = AgentInvoker::new(config.agent_cmd.clone(), config.agent_workspace.clone());
    let ledger = Ledger::new(config.ledger_path());
    Orchestrator::new(config.project.clone(), invoker, ledger)
}

/// Run exactly one phase (the `analyze`/`architect`/`code`/`test`/`design`
/// commands).
///
/// A failed phase is reported in the ledger and on the console; it does not
/// make the process exit non-zero. Only orchestration failures do.
pub async fn run_single_phase(config: &Config, kind: PhaseKind, task: &str) -> Result<()> {
    config.ensure_directories()?;

    let project_path = config.project_path.display().to_string();
    let ctx = PromptContext {
        project: &config.project,
        project_path: &project_path,
        task,
    };
    let spec = kind.spec(&ctx);

    let orchestrator = build_orchestrator(config);
    let outcome = orchestrator
        .run_phase(&spec)
        .await
        .context("Failed to record phase status")?;

    println!();
    println!(
        "Recorded {} as {} in {}",
        outcome.phase_id,
        outcome.status(),
        config.ledger_path().display()
    );
    Ok(())
}

/// Run the full workflow (the `run` command): analysis → architecture →
/// optional UI design → optional implementation → optional test writing.
pub async fn run_full_workflow(
    config: &Config,
    requirement: &str,
    plan: WorkflowPlan,
) -> Result<()> {
    config.ensure_directories()?;

    println!();
    println!("{}", style("Full development workflow").bold());
    println!("Project:     {}", config.project);
    println!("Requirement: {requirement}");

    let project_path = config.project_path.display().to_string();
    let ctx = PromptContext {
        project: &config.project,
        project_path: &project_path,
        task: requirement,
    };
    let specs: Vec<_> = assemble_workflow(&plan)
        .into_iter()
        .map(|kind| kind.spec(&ctx))
        .collect();

    let orchestrator = build_orchestrator(config);
    let outcome = orchestrator
        .run_workflow(&specs)
        .await
        .context("Failed to record phase status")?;

    print_summary(&outcome);
    println!("Ledger: {}", config.ledger_path().display());
    Ok(())
}

fn print_summary(outcome: &WorkflowOutcome) {
    println!();
    println!("{}", style("Workflow summary").bold());
    for phase in &outcome.outcomes {
        let marker = if phase.succeeded() {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };
        println!("  {} {:<16} {}", marker, phase.phase_id, phase.status());
    }
    println!(
        "{} completed, {} failed",
        outcome.completed(),
        outcome.failed()
    );
}
