// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Markdown rendering of an orchestration run.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::domain::audit::{AuditReport, ConnectorStatus};

/// Render `report` as a markdown document.
///
/// `layer_counts` is the number of entries held per layer after the run.
pub fn render_markdown(
    report: &AuditReport,
    recommendations: &[String],
    layer_counts: &BTreeMap<String, usize>,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = render_into(&mut out, report, recommendations, layer_counts);
    out
}

fn render_into(
    out: &mut String,
    report: &AuditReport,
    recommendations: &[String],
    layer_counts: &BTreeMap<String, usize>,
) -> std::fmt::Result {
    writeln!(out, "# Omni Engine Operational Report")?;
    writeln!(out)?;
    writeln!(out, "_Run `{}` at {}_", report.run_id, report.timestamp.to_rfc3339())?;
    writeln!(out)?;

    writeln!(out, "## Connector Audit")?;
    writeln!(out)?;
    writeln!(out, "| Connector | Status | Produced | Alerts | Duration (ms) |")?;
    writeln!(out, "|-----------|--------|----------|--------|---------------|")?;
    for audit in &report.connectors {
        let status = match &audit.status {
            ConnectorStatus::Succeeded => "succeeded".to_string(),
            ConnectorStatus::Failed { reason } => format!("failed: {}", reason.replace('|', "\\|")),
            ConnectorStatus::TimedOut => "timed out".to_string(),
        };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            audit.name,
            status,
            audit.produced,
            audit.alerts.len(),
            audit.duration_ms
        )?;
    }
    writeln!(out)?;

    if report.total_alerts() > 0 {
        writeln!(out, "## Ingestion Alerts")?;
        writeln!(out)?;
        for audit in &report.connectors {
            for alert in &audit.alerts {
                writeln!(out, "- **{}**: {}", audit.name, alert)?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "## Memory Layer Status")?;
    writeln!(out)?;
    if layer_counts.is_empty() {
        writeln!(out, "_No memory layers registered._")?;
    }
    for (layer, count) in layer_counts {
        writeln!(out, "- **{}**: {} entries", layer, count)?;
    }
    writeln!(out)?;

    writeln!(out, "## Recommendations")?;
    writeln!(out)?;
    for recommendation in recommendations {
        writeln!(out, "- {}", recommendation)?;
    }
    writeln!(out)?;
    writeln!(out, "_Report generated by OperatorCore._")?;
    Ok(())
}
