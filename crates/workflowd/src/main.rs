//! GRC Workflow Daemon - periodic approval sweeps
//!
//! The daemon provides:
//! - Escalation of approvals past their SLA
//! - Delivery of pending escalation notices
//! - Due-soon reminders to assignees
//! - Snapshot persistence of workflow state between runs

use clap::{Parser, Subcommand};
use grc_workflow_engine::TemplateRegistry;
use grc_workflowd::{Daemon, DaemonConfig, DaemonResult};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// GRC Workflow Daemon CLI
#[derive(Parser)]
#[command(name = "grc-workflowd")]
#[command(about = "GRC workflow daemon - escalation and reminder sweeps", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GRC_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides the configured level)
    #[arg(long, env = "GRC_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "GRC_LOG_JSON", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the sweep loop until interrupted (default)
    Run,

    /// Validate a template file and list its templates
    Check {
        /// Template file; defaults to the configured path
        templates: Option<String>,
    },
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = DaemonConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let daemon = Daemon::new(config)?;
            daemon.run().await
        }
        Command::Check { templates } => {
            let path = templates
                .map(PathBuf::from)
                .unwrap_or_else(|| config.templates_path.clone());
            let registry = TemplateRegistry::load_file(&path)?;

            println!("{}: {} template(s)", path.display(), registry.count());
            for template in registry.list() {
                println!(
                    "  {:<24} {} step(s), sla {}d, escalation {}{}",
                    template.code.as_str(),
                    template.step_count(),
                    template.default_sla_days,
                    if template.escalation_enabled { "on" } else { "off" },
                    if template.active { "" } else { " (inactive)" },
                );
            }
            Ok(())
        }
    }
}
