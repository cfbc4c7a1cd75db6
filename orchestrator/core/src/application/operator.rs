// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Connector Orchestrator
//!
//! Runs every registered [`Connector`] once per cycle, ingests what each one
//! produced into the [`MemoryBridge`] and returns an [`AuditReport`].
//!
//! ## Execution policies
//!
//! - [`ExecutionPolicy::Sequential`] gathers connectors one after another in
//!   registration order.
//! - [`ExecutionPolicy::Parallel`] spawns one task per connector, bounded by a
//!   semaphore of `max_workers` permits. Results are collected in registration
//!   order against one deadline for the whole run. A connector still running
//!   at the deadline is aborted and recorded as timed out.
//!
//! The deadline applies to every parallel run, including a run with a single
//! connector.
//!
//! Either way a failing connector (error, panic or timeout) contributes zero
//! entries and never stops the others. Ingestion always happens after
//! gathering, in registration order, so each connector's entries land in the
//! order it produced them.

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::bridge::MemoryBridge;
use crate::domain::audit::{AuditReport, ConnectorAudit, ConnectorExecution};
use crate::domain::config::{ExecutionConfig, OperatorConfig};
use crate::domain::connector::Connector;
use crate::domain::entry::MemoryEntry;
use crate::infrastructure::connectors::{
    FileBossConnector, MegaPdfConnector, StaticConnector, WhisperXConnector,
};

/// Number of history records surfaced by [`OperatorCore::metrics`]
const RECENT_EXECUTIONS: usize = 10;

/// Execution records kept by default before the oldest are dropped
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionPolicy {
    Sequential,
    Parallel { max_workers: usize, timeout: Duration },
}

impl ExecutionPolicy {
    pub fn from_config(config: &ExecutionConfig) -> Self {
        if config.parallel {
            ExecutionPolicy::Parallel {
                max_workers: config.max_workers.max(1),
                timeout: Duration::from_secs(config.timeout_seconds),
            }
        } else {
            ExecutionPolicy::Sequential
        }
    }
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }
}

/// Snapshot of orchestrator activity across runs.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationMetrics {
    pub connectors: Vec<String>,
    pub total_executions: usize,
    pub last_run: Option<DateTime<Utc>>,
    /// Share of successful executions, `0.0` before the first run
    pub success_rate: f64,
    pub recent_executions: Vec<ConnectorExecution>,
    pub policy: ExecutionPolicy,
}

/// What one connector handed back before ingestion.
struct Gathered {
    name: String,
    outcome: Outcome,
    elapsed: Duration,
}

enum Outcome {
    Produced(Vec<MemoryEntry>),
    Failed(String),
    TimedOut,
}

/// Bounded execution history. Totals count every execution ever recorded,
/// including those already evicted from `records`.
#[derive(Default)]
struct ExecutionLog {
    records: VecDeque<ConnectorExecution>,
    total: usize,
    successes: usize,
    last_run: Option<DateTime<Utc>>,
}

pub struct OperatorCore {
    bridge: Arc<MemoryBridge>,
    connectors: Vec<Arc<dyn Connector>>,
    policy: ExecutionPolicy,
    history_limit: usize,
    log: RwLock<ExecutionLog>,
}

impl OperatorCore {
    pub fn new(bridge: Arc<MemoryBridge>) -> Self {
        Self {
            bridge,
            connectors: Vec::new(),
            policy: ExecutionPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            log: RwLock::new(ExecutionLog::default()),
        }
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Keep at most `limit` execution records (at least one).
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.register_connector(Arc::new(connector));
        self
    }

    /// Build an operator from a configuration manifest.
    ///
    /// The manifest is validated first. Configured memory layers are
    /// registered up front so they show up in the catalog before the first run.
    pub fn from_config(config: &OperatorConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let spec = &config.spec;
        let bridge = Arc::new(MemoryBridge::with_layers(&spec.memory_layers)?);
        let mut operator = Self::new(bridge).with_policy(ExecutionPolicy::from_config(&spec.execution));

        let connectors = &spec.connectors;
        if let Some(fileboss) = connectors.fileboss.as_ref().filter(|c| c.enabled) {
            let mut connector = FileBossConnector::new(&fileboss.name, &fileboss.root);
            if let Some(layer) = &fileboss.layer {
                connector = connector.with_layer(layer);
            }
            operator.register_connector(Arc::new(connector));
        }
        if let Some(mega_pdf) = connectors.mega_pdf.as_ref().filter(|c| c.enabled) {
            operator.register_connector(Arc::new(
                MegaPdfConnector::new(&mega_pdf.name, &mega_pdf.documents_root)
                    .with_limits(mega_pdf.max_pages, mega_pdf.characters_per_page),
            ));
        }
        if let Some(whisperx) = connectors.whisperx.as_ref().filter(|c| c.enabled) {
            operator.register_connector(Arc::new(WhisperXConnector::new(
                &whisperx.name,
                &whisperx.transcripts_root,
            )));
        }
        for payloads in &connectors.static_payloads {
            operator.register_connector(Arc::new(
                StaticConnector::new(&payloads.name, &payloads.layer, payloads.payloads.iter())
                    .with_source(&payloads.source),
            ));
        }

        info!(
            "Operator configured with {} connectors and {} memory layers",
            operator.connectors.len(),
            operator.bridge.layer_names().len()
        );
        Ok(operator)
    }

    /// Register `connector` under its name, replacing any connector already
    /// registered under that name in place.
    pub fn register_connector(&mut self, connector: Arc<dyn Connector>) {
        match self
            .connectors
            .iter_mut()
            .find(|existing| existing.name() == connector.name())
        {
            Some(existing) => {
                debug!("Replacing connector '{}'", connector.name());
                *existing = connector;
            }
            None => self.connectors.push(connector),
        }
    }

    pub fn remove_connector(&mut self, name: &str) -> bool {
        let before = self.connectors.len();
        self.connectors.retain(|connector| connector.name() != name);
        self.connectors.len() != before
    }

    /// Connector names in registration order
    pub fn connector_names(&self) -> Vec<String> {
        self.connectors
            .iter()
            .map(|connector| connector.name().to_string())
            .collect()
    }

    pub fn bridge(&self) -> &Arc<MemoryBridge> {
        &self.bridge
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    /// Gather every connector once, ingest the results and audit the run.
    pub async fn run_cycle(&self) -> AuditReport {
        let gathered = match self.policy {
            ExecutionPolicy::Parallel { max_workers, timeout } => {
                self.gather_parallel(max_workers, timeout).await
            }
            ExecutionPolicy::Sequential => self.gather_sequential().await,
        };

        let audits: Vec<ConnectorAudit> = gathered
            .into_iter()
            .map(|gathered| self.ingest(gathered))
            .collect();

        let report = AuditReport::new(audits);
        self.record(&report);

        info!(
            "Run {} finished: {} connectors, {} entries, {} alerts, {} failed",
            report.run_id,
            report.connectors.len(),
            report.total_produced(),
            report.total_alerts(),
            report.failed().count()
        );
        report
    }

    /// Entries of every layer, keyed by layer name
    pub fn layer_snapshot(&self) -> BTreeMap<String, Vec<MemoryEntry>> {
        self.bridge.layer_snapshot()
    }

    /// Retained execution records, oldest first
    pub fn execution_history(&self) -> Vec<ConnectorExecution> {
        self.log.read().records.iter().cloned().collect()
    }

    pub fn metrics(&self) -> OrchestrationMetrics {
        let log = self.log.read();
        let success_rate = if log.total == 0 {
            0.0
        } else {
            log.successes as f64 / log.total as f64
        };
        let recent_start = log.records.len().saturating_sub(RECENT_EXECUTIONS);

        OrchestrationMetrics {
            connectors: self.connector_names(),
            total_executions: log.total,
            last_run: log.last_run,
            success_rate,
            recent_executions: log.records.iter().skip(recent_start).cloned().collect(),
            policy: self.policy,
        }
    }

    async fn gather_sequential(&self) -> Vec<Gathered> {
        let mut gathered = Vec::with_capacity(self.connectors.len());

        for connector in &self.connectors {
            let started = Instant::now();
            let outcome = match AssertUnwindSafe(connector.gather()).catch_unwind().await {
                Ok(Ok(entries)) => Outcome::Produced(entries),
                Ok(Err(e)) => Outcome::Failed(format!("{e:#}")),
                Err(panic) => Outcome::Failed(panic_reason(panic)),
            };

            gathered.push(Gathered {
                name: connector.name().to_string(),
                outcome,
                elapsed: started.elapsed(),
            });
        }

        gathered
    }

    async fn gather_parallel(&self, max_workers: usize, timeout: Duration) -> Vec<Gathered> {
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let run_started = Instant::now();
        let deadline = tokio::time::Instant::now() + timeout;

        debug!(
            "Spawning {} connectors on {} workers (timeout {:?})",
            self.connectors.len(),
            max_workers,
            timeout
        );

        let handles: Vec<(String, JoinHandle<(anyhow::Result<Vec<MemoryEntry>>, Duration)>)> = self
            .connectors
            .iter()
            .map(|connector| {
                let connector = connector.clone();
                let semaphore = semaphore.clone();
                let name = connector.name().to_string();
                let handle = tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return (Err(anyhow::anyhow!("worker pool closed: {}", e)), Duration::ZERO),
                    };
                    let started = Instant::now();
                    let result = connector.gather().await;
                    (result, started.elapsed())
                });
                (name, handle)
            })
            .collect();

        let mut gathered = Vec::with_capacity(handles.len());
        for (name, mut handle) in handles {
            let (outcome, elapsed) = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok((Ok(entries), elapsed))) => (Outcome::Produced(entries), elapsed),
                Ok(Ok((Err(e), elapsed))) => (Outcome::Failed(format!("{e:#}")), elapsed),
                Ok(Err(join_error)) => {
                    let reason = if join_error.is_panic() {
                        panic_reason(join_error.into_panic())
                    } else {
                        join_error.to_string()
                    };
                    (Outcome::Failed(reason), run_started.elapsed())
                }
                Err(_) => {
                    handle.abort();
                    warn!("Connector '{}' timed out after {:?}", name, timeout);
                    (Outcome::TimedOut, run_started.elapsed())
                }
            };
            gathered.push(Gathered { name, outcome, elapsed });
        }

        gathered
    }

    /// Store one connector's entries in the bridge and audit the result.
    ///
    /// Every entry's layer name is checked before anything is stored, so a
    /// connector is either ingested completely or not at all.
    fn ingest(&self, gathered: Gathered) -> ConnectorAudit {
        let Gathered { name, outcome, elapsed } = gathered;

        let entries = match outcome {
            Outcome::Produced(entries) => entries,
            Outcome::TimedOut => return ConnectorAudit::timed_out(&name, elapsed),
            Outcome::Failed(reason) => {
                warn!("Connector '{}' failed: {}", name, reason);
                return ConnectorAudit::failed(&name, reason, elapsed);
            }
        };

        if let Some(entry) = entries.iter().find(|entry| entry.layer().trim().is_empty()) {
            let reason = format!("entry from source '{}' has an empty layer name", entry.source());
            warn!("Connector '{}' output rejected: {}", name, reason);
            return ConnectorAudit::failed(&name, reason, elapsed);
        }

        let audit = ConnectorAudit::from_entries(&name, &entries, elapsed);
        for entry in entries {
            let stored = self
                .bridge
                .register_layer(entry.layer())
                .and_then(|layer| layer.add(entry));
            if let Err(e) = stored {
                warn!("Connector '{}' ingestion stopped: {}", name, e);
                return ConnectorAudit::failed(&name, e.to_string(), elapsed);
            }
        }

        debug!("Connector '{}' ingested {} entries in {:?}", name, audit.produced, elapsed);
        audit
    }

    fn record(&self, report: &AuditReport) {
        let mut log = self.log.write();
        for audit in &report.connectors {
            let record = ConnectorExecution::from_audit(report.run_id, report.timestamp, audit);
            log.total += 1;
            if record.success {
                log.successes += 1;
            }
            log.records.push_back(record);
        }

        let overflow = log.records.len().saturating_sub(self.history_limit);
        log.records.drain(..overflow);
        log.last_run = Some(report.timestamp);
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("connector panicked: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::ConnectorStatus;
    use crate::domain::entry::ALERT_LAYER;
    use async_trait::async_trait;

    struct FixedConnector {
        name: &'static str,
        entries: Vec<MemoryEntry>,
    }

    #[async_trait]
    impl Connector for FixedConnector {
        fn name(&self) -> &str {
            self.name
        }

        async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
            Ok(self.entries.clone())
        }
    }

    struct FailingConnector;

    #[async_trait]
    impl Connector for FailingConnector {
        fn name(&self) -> &str {
            "BROKEN"
        }

        async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
            anyhow::bail!("upstream unreachable")
        }
    }

    struct PanickingConnector;

    #[async_trait]
    impl Connector for PanickingConnector {
        fn name(&self) -> &str {
            "PANIC"
        }

        async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
            panic!("index out of range")
        }
    }

    struct SlowConnector;

    #[async_trait]
    impl Connector for SlowConnector {
        fn name(&self) -> &str {
            "SLOW"
        }

        async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![MemoryEntry::new("legal_evidence", "late", "SLOW")])
        }
    }

    fn fixed(name: &'static str, layer: &str, count: usize) -> FixedConnector {
        FixedConnector {
            name,
            entries: (0..count)
                .map(|i| MemoryEntry::new(layer, format!("{name}-{i}"), name))
                .collect(),
        }
    }

    fn new_operator(policy: ExecutionPolicy) -> OperatorCore {
        OperatorCore::new(Arc::new(MemoryBridge::new())).with_policy(policy)
    }

    #[tokio::test]
    async fn test_failing_connector_is_isolated() {
        let operator = new_operator(ExecutionPolicy::Sequential)
            .with_connector(fixed("FILES", "legal_evidence", 2))
            .with_connector(FailingConnector)
            .with_connector(fixed("AUDIO", "audio_transcripts", 1));

        let report = operator.run_cycle().await;

        assert_eq!(report.connectors.len(), 3);
        assert_eq!(report.audit("FILES").unwrap().produced, 2);
        assert_eq!(report.audit("AUDIO").unwrap().produced, 1);
        let broken = report.audit("BROKEN").unwrap();
        assert_eq!(broken.produced, 0);
        assert!(matches!(&broken.status, ConnectorStatus::Failed { reason } if reason.contains("upstream unreachable")));
        assert_eq!(operator.layer_snapshot()["legal_evidence"].len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_connector_is_isolated_sequentially() {
        let operator = new_operator(ExecutionPolicy::Sequential)
            .with_connector(PanickingConnector)
            .with_connector(fixed("FILES", "legal_evidence", 1));

        let report = operator.run_cycle().await;

        let panicked = report.audit("PANIC").unwrap();
        assert!(matches!(&panicked.status, ConnectorStatus::Failed { reason } if reason.contains("index out of range")));
        assert_eq!(report.audit("FILES").unwrap().produced, 1);
    }

    #[tokio::test]
    async fn test_parallel_policy_isolates_failures_and_keeps_order() {
        let operator = new_operator(ExecutionPolicy::Parallel {
            max_workers: 2,
            timeout: Duration::from_secs(5),
        })
        .with_connector(fixed("FILES", "legal_evidence", 3))
        .with_connector(PanickingConnector)
        .with_connector(FailingConnector)
        .with_connector(fixed("AUDIO", "audio_transcripts", 1));

        let report = operator.run_cycle().await;

        let names: Vec<&str> = report.connectors.iter().map(|audit| audit.name.as_str()).collect();
        assert_eq!(names, vec!["FILES", "PANIC", "BROKEN", "AUDIO"]);
        assert_eq!(report.total_produced(), 4);
        assert_eq!(report.failed().count(), 2);

        let contents: Vec<String> = operator.layer_snapshot()["legal_evidence"]
            .iter()
            .map(|entry| entry.content().to_string())
            .collect();
        assert_eq!(contents, vec!["FILES-0", "FILES-1", "FILES-2"]);
    }

    #[tokio::test]
    async fn test_parallel_timeout_discards_slow_connector() {
        let operator = new_operator(ExecutionPolicy::Parallel {
            max_workers: 4,
            timeout: Duration::from_millis(100),
        })
        .with_connector(SlowConnector)
        .with_connector(fixed("FILES", "legal_evidence", 1));

        let started = Instant::now();
        let report = operator.run_cycle().await;

        assert!(started.elapsed() < Duration::from_secs(10));
        let slow = report.audit("SLOW").unwrap();
        assert_eq!(slow.status, ConnectorStatus::TimedOut);
        assert_eq!(slow.produced, 0);
        assert_eq!(report.audit("FILES").unwrap().produced, 1);
        assert_eq!(operator.layer_snapshot()["legal_evidence"].len(), 1);
    }

    #[tokio::test]
    async fn test_parallel_timeout_applies_to_single_connector() {
        let operator = new_operator(ExecutionPolicy::Parallel {
            max_workers: 4,
            timeout: Duration::from_millis(100),
        })
        .with_connector(SlowConnector);

        let started = Instant::now();
        let report = operator.run_cycle().await;

        assert!(started.elapsed() < Duration::from_secs(10));
        let slow = report.audit("SLOW").unwrap();
        assert_eq!(slow.status, ConnectorStatus::TimedOut);
        assert_eq!(slow.produced, 0);
        assert!(operator.layer_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_register_connector_last_wins_in_place() {
        let mut operator = new_operator(ExecutionPolicy::Sequential)
            .with_connector(fixed("FILES", "legal_evidence", 1))
            .with_connector(fixed("AUDIO", "audio_transcripts", 1));
        operator.register_connector(Arc::new(fixed("FILES", "legal_evidence", 5)));

        assert_eq!(operator.connector_names(), vec!["FILES", "AUDIO"]);
        let report = operator.run_cycle().await;
        assert_eq!(report.audit("FILES").unwrap().produced, 5);

        assert!(operator.remove_connector("AUDIO"));
        assert!(!operator.remove_connector("AUDIO"));
    }

    #[tokio::test]
    async fn test_blank_layer_output_is_rejected_whole() {
        let operator = new_operator(ExecutionPolicy::Sequential).with_connector(FixedConnector {
            name: "MIXED",
            entries: vec![
                MemoryEntry::new("legal_evidence", "ok", "MIXED"),
                MemoryEntry::new("", "orphan", "MIXED"),
            ],
        });

        let report = operator.run_cycle().await;

        let audit = report.audit("MIXED").unwrap();
        assert_eq!(audit.produced, 0);
        assert!(!audit.succeeded());
        assert!(operator.layer_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_alerts_are_collected() {
        let operator = new_operator(ExecutionPolicy::Sequential).with_connector(FixedConnector {
            name: "ALERT",
            entries: vec![MemoryEntry::alert("dependency missing", "ALERT")],
        });

        let report = operator.run_cycle().await;

        assert_eq!(report.audit("ALERT").unwrap().alerts, vec!["dependency missing"]);
        assert_eq!(operator.layer_snapshot()[ALERT_LAYER].len(), 1);
    }

    #[tokio::test]
    async fn test_metrics_track_history() {
        let operator = new_operator(ExecutionPolicy::Sequential)
            .with_connector(fixed("FILES", "legal_evidence", 1))
            .with_connector(FailingConnector);

        let empty = operator.metrics();
        assert_eq!(empty.total_executions, 0);
        assert_eq!(empty.success_rate, 0.0);
        assert!(empty.last_run.is_none());

        for _ in 0..6 {
            operator.run_cycle().await;
        }

        let metrics = operator.metrics();
        assert_eq!(metrics.total_executions, 12);
        assert_eq!(metrics.recent_executions.len(), RECENT_EXECUTIONS);
        assert!((metrics.success_rate - 0.5).abs() < f64::EPSILON);
        assert!(metrics.last_run.is_some());
        assert_eq!(metrics.policy, ExecutionPolicy::Sequential);
    }

    #[tokio::test]
    async fn test_history_is_bounded_but_totals_are_not() {
        let operator = new_operator(ExecutionPolicy::Sequential)
            .with_history_limit(5)
            .with_connector(fixed("FILES", "legal_evidence", 1))
            .with_connector(FailingConnector);

        for _ in 0..4 {
            operator.run_cycle().await;
        }

        let history = operator.execution_history();
        assert_eq!(history.len(), 5);
        assert_eq!(history.last().unwrap().connector, "BROKEN");

        let metrics = operator.metrics();
        assert_eq!(metrics.total_executions, 8);
        assert_eq!(metrics.recent_executions.len(), 5);
        assert!((metrics.success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_config_rejects_invalid_manifest() {
        let mut config = OperatorConfig::default();
        config.spec.execution.timeout_seconds = 0;

        let err = OperatorCore::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = ExecutionConfig::default();
        assert_eq!(
            ExecutionPolicy::from_config(&config),
            ExecutionPolicy::Parallel {
                max_workers: 4,
                timeout: Duration::from_secs(300),
            }
        );

        config.parallel = false;
        assert_eq!(ExecutionPolicy::from_config(&config), ExecutionPolicy::Sequential);
    }
}
