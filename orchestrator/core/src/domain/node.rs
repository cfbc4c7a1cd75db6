// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Intelligence Node contract
//!
//! A node is anything that can be polled for new entries and can receive
//! entries broadcast by other nodes. Nodes own their own "what's new"
//! bookkeeping, so methods take `&self` and implementations use interior
//! mutability.

use crate::domain::entry::MemoryEntry;

pub trait IntelligenceNode: Send + Sync {
    /// Stable name used in logs and error reports.
    fn name(&self) -> &str;

    /// Entries produced since the previous poll.
    fn fetch_updates(&self) -> anyhow::Result<Vec<MemoryEntry>>;

    /// Handle an entry produced elsewhere and broadcast by the witness network.
    fn apply_update(&self, entry: &MemoryEntry) -> anyhow::Result<()>;
}
