// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Layer Store
//!
//! The owned arena of memory layers: one map, keyed by name, holding every
//! layer for the lifetime of the store. Layers are never removed.
//!
//! The map lock only guards lookups and creation. Appends go through each
//! layer's own lock, so writers on different layers never contend.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entry::MemoryEntry;
use crate::domain::error::BridgeError;
use crate::domain::layer::{LayerResolver, MemoryLayer};

#[derive(Debug, Default)]
pub struct LayerStore {
    layers: RwLock<BTreeMap<String, Arc<MemoryLayer>>>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<MemoryLayer>> {
        self.layers.read().get(name).cloned()
    }

    /// Return the layer called `name`, creating it if needed.
    ///
    /// The flag is `true` when this call created the layer.
    pub fn get_or_create(&self, name: &str) -> Result<(Arc<MemoryLayer>, bool), BridgeError> {
        if name.trim().is_empty() {
            return Err(BridgeError::InvalidName);
        }

        if let Some(layer) = self.get(name) {
            return Ok((layer, false));
        }

        let mut layers = self.layers.write();
        // Another writer may have created it between the read and write lock
        if let Some(layer) = layers.get(name) {
            return Ok((layer.clone(), false));
        }

        debug!("Creating memory layer '{}'", name);
        let layer = Arc::new(MemoryLayer::new(name));
        layers.insert(name.to_string(), layer.clone());
        Ok((layer, true))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.read().contains_key(name)
    }

    /// Layer names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.layers.read().keys().cloned().collect()
    }

    /// Every layer's entries, keyed by layer name
    pub fn snapshot(&self) -> BTreeMap<String, Vec<MemoryEntry>> {
        self.layers
            .read()
            .iter()
            .map(|(name, layer)| (name.clone(), layer.all()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }
}

impl LayerResolver for LayerStore {
    fn resolve_layer(&self, name: &str) -> Result<Arc<MemoryLayer>, BridgeError> {
        self.get_or_create(name).map(|(layer, _)| layer)
    }
}
