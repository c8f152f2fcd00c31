//! Ledger inspection and reset.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use devcrew::config::Config;
use devcrew::errors::LedgerError;
use devcrew::ledger::Ledger;
use devcrew::phase::PhaseStatus;

pub fn cmd_status(config: &Config) -> Result<()> {
    let ledger = Ledger::new(config.ledger_path());

    println!();
    println!("Project: {}", config.project);
    println!("Ledger:  {}", ledger.path().display());
    println!();

    match ledger.project_record(&config.project)? {
        Some(record) => {
            println!(
                "Last update: {}",
                record.updated_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!();
            println!("{:<16} {:<18} {:<10} Result", "Phase", "Agent", "Status");
            for (phase_id, phase) in &record.phases {
                let status = match phase.status {
                    PhaseStatus::Completed => style("completed").green(),
                    PhaseStatus::Failed => style("failed").red(),
                    PhaseStatus::Running => style("running").yellow(),
                    PhaseStatus::Pending => style("pending").dim(),
                };
                println!(
                    "{:<16} {:<18} {:<10} {}",
                    phase_id,
                    phase.agent.id(),
                    status,
                    result_preview(&phase.result)
                );
            }
        }
        None => {
            println!("No phases recorded yet. Run 'devcrew run' to start the workflow.");
        }
    }
    println!();
    Ok(())
}

pub fn cmd_reset(config: &Config, force: bool) -> Result<()> {
    if !force {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "This will clear recorded phase statuses for '{}'. Are you sure?",
                config.project
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    let ledger = Ledger::new(config.ledger_path());
    match ledger.reset_project(&config.project) {
        Ok(true) => println!("Reset complete"),
        Ok(false) => println!("Nothing recorded for '{}'", config.project),
        // A corrupt store cannot be merged; --force is explicit consent to
        // drop it wholesale.
        Err(LedgerError::Corrupt { .. }) if force => {
            println!(
                "{} ledger is corrupt; removing the whole store",
                style("Warning:").yellow().bold()
            );
            ledger.reset_all()?;
            println!("Reset complete");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// First line of a stored result, shortened for the status table.
fn result_preview(result: &str) -> String {
    let first = result.lines().next().unwrap_or("");
    if first.chars().count() > 60 {
        let cut: String = first.chars().take(57).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}
