// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Memory Layer
//!
//! An append-only, named partition of [`MemoryEntry`] values. Insertion order is
//! arrival order, which may differ from timestamp order when entries are built
//! with explicit past timestamps.
//!
//! Each layer carries its own lock, so parallel writers appending to the same
//! layer are serialized without corrupting order or dropping entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::entry::{parse_since, MemoryEntry};
use crate::domain::error::BridgeError;

#[derive(Debug)]
pub struct MemoryLayer {
    name: String,
    entries: RwLock<Vec<MemoryEntry>>,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `entry`. Fails when the entry belongs to another layer.
    pub fn add(&self, entry: MemoryEntry) -> Result<(), BridgeError> {
        if entry.layer() != self.name {
            return Err(BridgeError::LayerMismatch {
                expected: self.name.clone(),
                actual: entry.layer().to_string(),
            });
        }
        self.entries.write().push(entry);
        Ok(())
    }

    /// Snapshot of every entry in insertion order.
    pub fn all(&self) -> Vec<MemoryEntry> {
        self.entries.read().clone()
    }

    /// Entries with `timestamp >= since`, insertion order preserved.
    ///
    /// `DateTime<Utc>` is always offset-aware; callers holding a raw string go
    /// through [`MemoryLayer::query_iso`], which enforces that contract.
    pub fn query(&self, since: Option<DateTime<Utc>>) -> Vec<MemoryEntry> {
        match since {
            None => self.all(),
            Some(since) => self
                .entries
                .read()
                .iter()
                .filter(|entry| entry.timestamp() >= since)
                .cloned()
                .collect(),
        }
    }

    /// Like [`MemoryLayer::query`] but takes an ISO-8601 string that must carry
    /// a timezone offset.
    pub fn query_iso(&self, since: Option<&str>) -> Result<Vec<MemoryEntry>, BridgeError> {
        let since = since.map(parse_since).transpose()?;
        Ok(self.query(since))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Resolves a layer by name, creating it on first reference.
///
/// Implemented by the bare [`LayerStore`](crate::infrastructure::layer_store::LayerStore)
/// and by the [`MemoryBridge`](crate::application::bridge::MemoryBridge), which
/// also keeps its catalog in step with newly created layers.
pub trait LayerResolver: Send + Sync {
    fn resolve_layer(&self, name: &str) -> Result<Arc<MemoryLayer>, BridgeError>;
}
