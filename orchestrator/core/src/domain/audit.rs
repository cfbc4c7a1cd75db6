// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Ingestion Audit Model
//!
//! Result objects describing one orchestration run:
//!
//! - [`ConnectorAudit`]: what a single connector produced (or why it failed).
//! - [`AuditReport`]: the timestamped collection of audits for a run.
//! - [`ConnectorExecution`]: a history record retained by the orchestrator
//!   across runs for metrics.
//!
//! Audits are created fresh per run and are not retained by the bridge.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entry::MemoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a connector's gather call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectorStatus {
    Succeeded,
    /// `gather()` returned an error or panicked, or its output could not be ingested
    Failed { reason: String },
    /// Did not finish before the run deadline; partial output discarded
    TimedOut,
}

/// Outcome of running one connector during an ingestion cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorAudit {
    pub name: String,
    pub produced: usize,
    pub layer_counts: BTreeMap<String, usize>,
    pub alerts: Vec<String>,
    pub status: ConnectorStatus,
    pub duration_ms: u64,
}

impl ConnectorAudit {
    /// Audit a successful gather from the entries it produced.
    pub fn from_entries(name: &str, entries: &[MemoryEntry], elapsed: Duration) -> Self {
        let mut layer_counts = BTreeMap::new();
        let mut alerts = Vec::new();

        for entry in entries {
            *layer_counts.entry(entry.layer().to_string()).or_insert(0) += 1;
            if entry.is_alert() {
                alerts.push(entry.content().to_string());
            }
        }

        Self {
            name: name.to_string(),
            produced: entries.len(),
            layer_counts,
            alerts,
            status: ConnectorStatus::Succeeded,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failed(name: &str, reason: impl Into<String>, elapsed: Duration) -> Self {
        Self::empty(name, ConnectorStatus::Failed { reason: reason.into() }, elapsed)
    }

    pub fn timed_out(name: &str, elapsed: Duration) -> Self {
        Self::empty(name, ConnectorStatus::TimedOut, elapsed)
    }

    fn empty(name: &str, status: ConnectorStatus, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            produced: 0,
            layer_counts: BTreeMap::new(),
            alerts: Vec::new(),
            status,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == ConnectorStatus::Succeeded
    }
}

/// Summary of a full ingestion cycle across all connectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub connectors: Vec<ConnectorAudit>,
}

impl AuditReport {
    pub fn new(connectors: Vec<ConnectorAudit>) -> Self {
        Self {
            run_id: RunId::new(),
            timestamp: Utc::now(),
            connectors,
        }
    }

    pub fn audit(&self, name: &str) -> Option<&ConnectorAudit> {
        self.connectors.iter().find(|audit| audit.name == name)
    }

    pub fn total_produced(&self) -> usize {
        self.connectors.iter().map(|audit| audit.produced).sum()
    }

    pub fn total_alerts(&self) -> usize {
        self.connectors.iter().map(|audit| audit.alerts.len()).sum()
    }

    /// Entries produced per layer, summed across connectors.
    pub fn layer_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for audit in &self.connectors {
            for (layer, count) in &audit.layer_counts {
                *distribution.entry(layer.clone()).or_insert(0) += count;
            }
        }
        distribution
    }

    pub fn failed(&self) -> impl Iterator<Item = &ConnectorAudit> {
        self.connectors.iter().filter(|audit| !audit.succeeded())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// History record of a single connector execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorExecution {
    pub connector: String,
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub entries: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectorExecution {
    pub fn from_audit(run_id: RunId, timestamp: DateTime<Utc>, audit: &ConnectorAudit) -> Self {
        let error = match &audit.status {
            ConnectorStatus::Succeeded => None,
            ConnectorStatus::Failed { reason } => Some(reason.clone()),
            ConnectorStatus::TimedOut => Some("timed out".to_string()),
        };

        Self {
            connector: audit.name.clone(),
            run_id,
            timestamp,
            entries: audit.produced,
            success: audit.succeeded(),
            error,
        }
    }
}
