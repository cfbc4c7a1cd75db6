// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `omni run`: one ingestion cycle with audit output

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use omni_core::application::{generate_recommendations, render_markdown};
use omni_core::audit::{AuditReport, ConnectorStatus};

use super::{build_operator, load_config};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Gather connectors one at a time regardless of configuration
    #[arg(long)]
    pub sequential: bool,

    /// Print the audit as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Also write a markdown report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    report: &'a AuditReport,
    recommendations: &'a [String],
    layers: &'a BTreeMap<String, usize>,
}

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if args.sequential {
        config.spec.execution.parallel = false;
    }

    let operator = build_operator(&config)?;
    let report = operator.run_cycle().await;
    let recommendations = generate_recommendations(&report);
    let layers: BTreeMap<String, usize> = operator
        .layer_snapshot()
        .into_iter()
        .map(|(name, entries)| (name, entries.len()))
        .collect();

    if args.json {
        let output = RunOutput {
            report: &report,
            recommendations: &recommendations,
            layers: &layers,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&report, &recommendations, &layers);
    }

    if let Some(path) = args.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        std::fs::write(&path, render_markdown(&report, &recommendations, &layers))
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
        if !args.json {
            println!("{}", format!("✓ Report written to {}", path.display()).green());
        }
    }

    Ok(())
}

fn print_summary(report: &AuditReport, recommendations: &[String], layers: &BTreeMap<String, usize>) {
    println!("{} {}", "Run".bold(), report.run_id.to_string().dimmed());
    println!();

    println!("{}", "Connectors:".bold());
    for audit in &report.connectors {
        let status = match &audit.status {
            ConnectorStatus::Succeeded => "ok".green(),
            ConnectorStatus::Failed { .. } => "failed".red(),
            ConnectorStatus::TimedOut => "timed out".red(),
        };
        println!(
            "  {} [{}] {} entries, {} alerts ({} ms)",
            audit.name.bold(),
            status,
            audit.produced,
            audit.alerts.len(),
            audit.duration_ms
        );
        if let ConnectorStatus::Failed { reason } = &audit.status {
            println!("    {}", reason.red());
        }
        for alert in &audit.alerts {
            println!("    {} {}", "!".yellow(), alert);
        }
    }
    println!();

    println!("{}", "Memory Layers:".bold());
    for (layer, count) in layers {
        println!("  {}: {}", layer, count);
    }
    println!();

    println!("{}", "Recommendations:".bold());
    for recommendation in recommendations {
        println!("  - {}", recommendation);
    }
}
