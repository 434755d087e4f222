use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use symbolgraph::cli::{Cli, Commands};
use symbolgraph::commands::{self, Workspace};
use symbolgraph::config::Config;
use symbolgraph::logging::{init_early_logging, init_logging};
use symbolgraph::metrics;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let config = match Config::load(&project_root) {
        Ok(config) => config,
        Err(e) => {
            init_early_logging();
            return Err(e);
        }
    };

    // Held until exit so buffered logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;
    tracing::debug!("Project root: {}", project_root.display());

    metrics::register_metrics().context("Failed to register metrics")?;

    let workspace = Workspace::open(&cli.index, &project_root, config)?;

    match cli.command {
        Commands::Files => commands::files::run(&workspace)?,
        Commands::Symbols { module_path } => commands::symbols::run(&workspace, &module_path)?,
        Commands::Context { uri } => commands::context::run(&workspace, &uri)?,
        Commands::Query { query } => commands::query::run(&workspace, &query.join(" "))?,
        Commands::Rank { query, limit } => {
            commands::rank::run(&workspace, query.as_deref(), limit)?
        }
        Commands::Stats { prometheus } => commands::stats::run(&workspace, prometheus)?,
    }

    Ok(())
}
