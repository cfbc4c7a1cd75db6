// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Connector contract
//!
//! A connector is a one-shot producer of entries from an external source.
//! Expected operational problems (an unreadable file, a disabled optional
//! capability) are reported as entries on
//! [`ALERT_LAYER`](crate::domain::entry::ALERT_LAYER); returning `Err` is
//! reserved for unexpected failures, which the orchestrator isolates.

use async_trait::async_trait;

use crate::domain::entry::MemoryEntry;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Registration key within an orchestrator.
    fn name(&self) -> &str;

    /// Produce this run's entries. Called exactly once per orchestration run.
    async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>>;
}
