use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use devcrew::config::Config;
use devcrew::phase::{PhaseKind, WorkflowPlan};

mod cmd;

#[derive(Parser)]
#[command(name = "devcrew")]
#[command(version, about = "Multi-agent development workflow orchestrator")]
pub struct Cli {
    /// Project name (ledger key and label passed to agents)
    #[arg(short, long)]
    pub project: String,

    /// Project path (defaults to ~/Projects/<project>)
    #[arg(long)]
    pub project_path: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Requirement analysis (product manager)
    Analyze {
        #[arg(short, long)]
        requirement: String,
    },
    /// Architecture design (architect)
    Architect {
        #[arg(short, long)]
        task: String,
    },
    /// Code implementation (software engineer)
    Code {
        #[arg(short, long)]
        task: String,
    },
    /// Test-case writing (test engineer)
    Test {
        #[arg(short, long)]
        task: String,
    },
    /// UI design (ui designer)
    Design {
        #[arg(short, long)]
        task: String,
    },
    /// Full workflow: analysis, architecture, then optional UI/code/tests
    Run {
        #[arg(short, long)]
        requirement: String,

        /// Skip the UI design phase
        #[arg(long)]
        skip_ui: bool,

        /// Skip the implementation phase
        #[arg(long)]
        skip_code: bool,

        /// Skip the test-writing phase
        #[arg(long)]
        skip_test: bool,
    },
    /// Show recorded phase statuses for the project
    Status,
    /// Clear the project's recorded phase statuses
    Reset {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "devcrew=debug"
    } else {
        "devcrew=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::new(cli.project.clone(), cli.project_path.clone(), cli.verbose)?;

    match &cli.command {
        Commands::Analyze { requirement } => {
            cmd::run_single_phase(&config, PhaseKind::PmAnalysis, requirement).await?;
        }
        Commands::Architect { task } => {
            cmd::run_single_phase(&config, PhaseKind::Architecture, task).await?;
        }
        Commands::Code { task } => {
            cmd::run_single_phase(&config, PhaseKind::Implementation, task).await?;
        }
        Commands::Test { task } => {
            cmd::run_single_phase(&config, PhaseKind::Testing, task).await?;
        }
        Commands::Design { task } => {
            cmd::run_single_phase(&config, PhaseKind::UiDesign, task).await?;
        }
        Commands::Run {
            requirement,
            skip_ui,
            skip_code,
            skip_test,
        } => {
            let plan = WorkflowPlan {
                skip_ui: *skip_ui,
                skip_code: *skip_code,
                skip_test: *skip_test,
            };
            cmd::run_full_workflow(&config, requirement, plan).await?;
        }
        Commands::Status => cmd::cmd_status(&config)?,
        Commands::Reset { force } => cmd::cmd_reset(&config, *force)?,
    }

    Ok(())
}
