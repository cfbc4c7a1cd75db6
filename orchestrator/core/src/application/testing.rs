// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Shared test doubles for the application layer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::entry::MemoryEntry;
use crate::domain::node::IntelligenceNode;

/// Node that hands out a scripted outbox once and records what it receives.
pub(crate) struct ScriptedNode {
    name: String,
    outbox: Mutex<Vec<MemoryEntry>>,
    inbound: Mutex<Vec<MemoryEntry>>,
}

impl ScriptedNode {
    pub(crate) fn new(name: &str, outbox: Vec<MemoryEntry>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outbox: Mutex::new(outbox),
            inbound: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn inbound(&self) -> Vec<MemoryEntry> {
        self.inbound.lock().clone()
    }
}

impl IntelligenceNode for ScriptedNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_updates(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        Ok(std::mem::take(&mut *self.outbox.lock()))
    }

    fn apply_update(&self, entry: &MemoryEntry) -> anyhow::Result<()> {
        self.inbound.lock().push(entry.clone());
        Ok(())
    }
}

pub(crate) fn as_node(node: &Arc<ScriptedNode>) -> Arc<dyn IntelligenceNode> {
    node.clone()
}
