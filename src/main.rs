mod cli;
mod core;
mod rpc;
mod store;
mod util;

use clap::Parser;
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, Commands};
use crate::core::config::Config;
use crate::core::operations::orchestrator::{ActionOrchestrator, Collaborators};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// stdout carries command output and JSON-RPC responses, so logs go to stderr.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SD_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_orchestrator(config: &Config) -> ActionOrchestrator {
    ActionOrchestrator::new(
        config.site.clone(),
        config.targets.clone(),
        Collaborators::production(config.mysqladmin.clone()),
    )
    .with_code_length(config.code_length)
}

async fn run(cli: Cli) -> crate::core::errors::SDResult<()> {
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Human };

    let cwd = std::env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd, cli.overrides())?;
    if let Some(source) = &config.source {
        tracing::debug!("Loaded config from {}", source.display());
    }
    let orchestrator = build_orchestrator(&config);

    match cli.command {
        Commands::Destroy { yes } => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let mut stderr = std::io::stderr();
            cli::commands::destroy::run(
                &orchestrator,
                yes,
                format,
                &mut stdin.lock(),
                &mut stdout,
                &mut stderr,
            )
        }
        Commands::Plan => cli::commands::plan::run(&orchestrator, format),
        Commands::Serve { .. } => {
            rpc::run_server(Arc::new(orchestrator), config.auth_token.clone()).await
        }
    }
}
