// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Omni Engine CLI
//!
//! The `omni` binary runs evidence ingestion cycles against an in-memory
//! bridge and reports on them.
//!
//! ## Commands
//!
//! - `omni run [--sequential] [--json] [--output FILE]` - Run one ingestion cycle
//! - `omni catalog` - Print the capability catalog
//! - `omni export <layer> [--since TIMESTAMP]` - Run a cycle, then export one layer
//! - `omni config show|validate|generate` - Configuration management
//!
//! Memory is not persisted between invocations: every command that needs data
//! runs its own cycle.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use omni_engine::commands::{self, ConfigCommand, ExportArgs, RunArgs};

/// Omni Engine - Layered evidence ingestion
#[derive(Parser)]
#[command(name = "omni")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "OMNI_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OMNI_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured connector once and print the audit
    #[command(name = "run")]
    Run(RunArgs),

    /// Print the capability catalog as JSON
    #[command(name = "catalog")]
    Catalog,

    /// Run a cycle and export one memory layer as JSON
    #[command(name = "export")]
    Export(ExportArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Run(args)) => commands::run::execute(args, cli.config).await,
        Some(Commands::Catalog) => commands::catalog::execute(cli.config).await,
        Some(Commands::Export(args)) => commands::export::execute(args, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
