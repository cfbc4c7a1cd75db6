// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use omni_core::config::OperatorConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./omni-config.yaml)
        #[arg(short, long, default_value = "./omni-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = OperatorConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. OMNI_CONFIG_PATH: {}",
            std::env::var("OMNI_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./omni-config.yaml");
        println!("  4. ~/.omni/config.yaml");
        println!("  5. /etc/omni/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Operator:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    let execution = &config.spec.execution;
    println!("{}", "Execution:".bold());
    println!("  Parallel: {}", execution.parallel);
    println!("  Max workers: {}", execution.max_workers);
    println!("  Timeout: {}s", execution.timeout_seconds);
    println!();

    println!("{}", "Memory Layers:".bold());
    for layer in &config.spec.memory_layers {
        println!("  - {}", layer);
    }
    println!();

    println!("{}", "Connectors:".bold());
    let connectors = &config.spec.connectors;
    if let Some(fileboss) = &connectors.fileboss {
        println!("  {} ({}) → {}", fileboss.name.bold(), enabled(fileboss.enabled), fileboss.root.display());
    }
    if let Some(mega_pdf) = &connectors.mega_pdf {
        println!(
            "  {} ({}) → {}",
            mega_pdf.name.bold(),
            enabled(mega_pdf.enabled),
            mega_pdf.documents_root.display()
        );
    }
    if let Some(whisperx) = &connectors.whisperx {
        println!(
            "  {} ({}) → {}",
            whisperx.name.bold(),
            enabled(whisperx.enabled),
            whisperx.transcripts_root.display()
        );
    }
    for payloads in &connectors.static_payloads {
        println!(
            "  {} (static) → {} [{} payloads]",
            payloads.name.bold(),
            payloads.layer,
            payloads.payloads.len()
        );
    }
    println!();

    Ok(())
}

fn enabled(flag: bool) -> colored::ColoredString {
    if flag {
        "enabled".green()
    } else {
        "disabled".dimmed()
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_templates_parse_and_validate() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = omni_core::config::OperatorConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }
}
