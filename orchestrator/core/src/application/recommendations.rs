// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::audit::{AuditReport, ConnectorStatus};

pub const NOMINAL: &str = "All connectors are operating nominally. Continue monitoring throughput.";

/// Turn an audit into operator-facing advice, one line per finding.
///
/// Findings follow connector order. A connector can trigger several: a failed
/// connector is also reported as having produced nothing.
pub fn generate_recommendations(report: &AuditReport) -> Vec<String> {
    let mut recommendations = Vec::new();

    for audit in &report.connectors {
        match &audit.status {
            ConnectorStatus::Succeeded => {}
            ConnectorStatus::Failed { reason } => recommendations.push(format!(
                "Connector '{}' failed: {}. Inspect it before the next run.",
                audit.name, reason
            )),
            ConnectorStatus::TimedOut => recommendations.push(format!(
                "Connector '{}' timed out. Raise the timeout or reduce its workload.",
                audit.name
            )),
        }
        if audit.produced == 0 {
            recommendations.push(format!(
                "Connector '{}' produced no entries. Verify its data sources.",
                audit.name
            ));
        }
        if !audit.alerts.is_empty() {
            recommendations.push(format!(
                "Connector '{}' emitted {} alerts that require review.",
                audit.name,
                audit.alerts.len()
            ));
        }
    }

    if recommendations.is_empty() {
        recommendations.push(NOMINAL.to_string());
    }
    recommendations
}
