// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Memory Bridge
//!
//! Facade over the layer store, the witness network and the capability
//! catalog. The bridge is the single owner of its layers: fusion writes and
//! orchestrator ingestion both land here.
//!
//! Whenever a layer comes into existence, through [`MemoryBridge::register_layer`]
//! or implicitly during [`MemoryBridge::sync`], its `memory.fetch_<name>`
//! capability is (re)registered so the catalog tracks the live layer set.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::application::fusion::FusionLoop;
use crate::domain::catalog::{FunctionSpec, McpCatalog};
use crate::domain::entry::{EntryRecord, MemoryEntry};
use crate::domain::error::BridgeError;
use crate::domain::layer::{LayerResolver, MemoryLayer};
use crate::domain::node::IntelligenceNode;
use crate::infrastructure::layer_store::LayerStore;
use crate::infrastructure::witness::WitnessNetwork;

pub struct MemoryBridge {
    layers: LayerStore,
    catalog: RwLock<McpCatalog>,
    witnesses: Arc<WitnessNetwork>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::with_witnesses(Arc::new(WitnessNetwork::default()))
    }

    /// Build a bridge that broadcasts through an existing witness network
    pub fn with_witnesses(witnesses: Arc<WitnessNetwork>) -> Self {
        Self {
            layers: LayerStore::new(),
            catalog: RwLock::new(McpCatalog::new()),
            witnesses,
        }
    }

    /// Build a bridge with `names` pre-registered.
    pub fn with_layers<I, S>(names: I) -> Result<Self, BridgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bridge = Self::new();
        for name in names {
            bridge.register_layer(name.as_ref())?;
        }
        Ok(bridge)
    }

    /// Return the layer called `name`, creating it (and its catalog spec) on first use.
    pub fn register_layer(&self, name: &str) -> Result<Arc<MemoryLayer>, BridgeError> {
        let (layer, created) = self.layers.get_or_create(name)?;
        if created {
            self.catalog.write().register(layer_spec(name)?, true)?;
            debug!("Registered capability memory.fetch_{}", name);
        }
        Ok(layer)
    }

    pub fn get_layer(&self, name: &str) -> Result<Arc<MemoryLayer>, BridgeError> {
        self.layers
            .get(name)
            .ok_or_else(|| BridgeError::NotFound(format!("layer '{}'", name)))
    }

    /// Sorted names of every live layer
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.names()
    }

    pub fn layer_snapshot(&self) -> BTreeMap<String, Vec<MemoryEntry>> {
        self.layers.snapshot()
    }

    pub fn register_node(&self, node: &Arc<dyn IntelligenceNode>) {
        self.witnesses.register(node);
    }

    /// Run one fusion cycle over `nodes` against this bridge's layers.
    pub fn sync(&self, nodes: &[Arc<dyn IntelligenceNode>]) -> Result<usize, BridgeError> {
        FusionLoop::new(self, &self.witnesses).cycle(nodes)
    }

    /// Serialized entries of layer `name`, optionally those at or after `since`.
    ///
    /// `since` must be ISO-8601 with a timezone offset.
    pub fn export_layer(&self, name: &str, since: Option<&str>) -> Result<Vec<EntryRecord>, BridgeError> {
        let layer = self.get_layer(name)?;
        Ok(layer
            .query_iso(since)?
            .iter()
            .map(EntryRecord::from)
            .collect())
    }

    pub fn export_layer_json(&self, name: &str, since: Option<&str>) -> anyhow::Result<String> {
        let records = self.export_layer(name, since)?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    pub fn describe_functions(&self) -> Vec<FunctionSpec> {
        self.catalog.read().describe()
    }

    /// Register an additional capability alongside the per-layer ones
    pub fn register_function(&self, spec: FunctionSpec, replace: bool) -> Result<(), BridgeError> {
        self.catalog.write().register(spec, replace)
    }

    pub fn witnesses(&self) -> &Arc<WitnessNetwork> {
        &self.witnesses
    }
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerResolver for MemoryBridge {
    fn resolve_layer(&self, name: &str) -> Result<Arc<MemoryLayer>, BridgeError> {
        self.register_layer(name)
    }
}

fn layer_spec(name: &str) -> Result<FunctionSpec, BridgeError> {
    Ok(FunctionSpec::new(
        &format!("memory.fetch_{name}"),
        &format!("Retrieve stored entries from the '{name}' memory layer."),
    )?
    .with_input("since", "Optional ISO-8601 timestamp used to filter results.")
    .with_output(
        "entries",
        "List of serialized memory entries with layer, source, content, and timestamp.",
    )
    .with_tag("memory")
    .with_tag(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{as_node, ScriptedNode};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_register_layer_is_idempotent() {
        let bridge = MemoryBridge::new();

        let first = bridge.register_layer("legal_evidence").unwrap();
        let second = bridge.register_layer("legal_evidence").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let specs = bridge.describe_functions();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name(), "memory.fetch_legal_evidence");
        assert_eq!(specs[0].tags(), ["memory", "legal_evidence"]);
        assert!(specs[0].inputs().contains_key("since"));
    }

    #[test]
    fn test_register_layer_rejects_blank_names() {
        let bridge = MemoryBridge::new();
        assert!(matches!(bridge.register_layer(" \t"), Err(BridgeError::InvalidName)));
        assert!(bridge.describe_functions().is_empty());
    }

    #[test]
    fn test_get_layer_unknown() {
        let bridge = MemoryBridge::new();
        assert!(matches!(bridge.get_layer("missing"), Err(BridgeError::NotFound(_))));
        assert!(matches!(bridge.export_layer("missing", None), Err(BridgeError::NotFound(_))));
    }

    #[test]
    fn test_export_layer_filters_and_serializes() {
        let bridge = MemoryBridge::new();
        let layer = bridge.register_layer("legal_evidence").unwrap();
        let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        layer
            .add(MemoryEntry::with_timestamp("legal_evidence", "old", "FILES", old))
            .unwrap();
        layer
            .add(MemoryEntry::with_timestamp("legal_evidence", "new", "FILES", new))
            .unwrap();

        let records = bridge
            .export_layer("legal_evidence", Some("2024-02-01T00:00:00+00:00"))
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "new");
        assert_eq!(records[0].timestamp, "2024-03-01T12:00:00+00:00");
        assert!(matches!(
            bridge.export_layer("legal_evidence", Some("2024-02-01T00:00:00")),
            Err(BridgeError::NaiveTimestamp(_))
        ));
    }

    #[test]
    fn test_sync_registers_specs_for_implicit_layers() {
        let bridge = MemoryBridge::new();
        let a = ScriptedNode::new("A", vec![MemoryEntry::new("audio_transcripts", "call", "A")]);
        let b = ScriptedNode::new("B", Vec::new());
        bridge.register_node(&as_node(&a));
        bridge.register_node(&as_node(&b));

        let fused = bridge.sync(&[as_node(&a), as_node(&b)]).unwrap();

        assert_eq!(fused, 1);
        assert_eq!(bridge.layer_names(), vec!["audio_transcripts"]);
        assert_eq!(bridge.describe_functions()[0].name(), "memory.fetch_audio_transcripts");
        assert_eq!(b.inbound().len(), 1);
        assert!(a.inbound().is_empty());
    }

    #[test]
    fn test_describe_functions_is_stable() {
        let bridge = MemoryBridge::with_layers(["legal_evidence", "audio_transcripts"]).unwrap();

        let first = bridge.describe_functions();
        let second = bridge.describe_functions();

        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|spec| spec.name()).collect();
        assert_eq!(
            names,
            vec!["memory.fetch_audio_transcripts", "memory.fetch_legal_evidence"]
        );
    }

    #[test]
    fn test_export_layer_json() {
        let bridge = MemoryBridge::new();
        bridge
            .register_layer("legal_evidence")
            .unwrap()
            .add(MemoryEntry::new("legal_evidence", "doc", "FILES"))
            .unwrap();

        let json = bridge.export_layer_json("legal_evidence", None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["layer"], "legal_evidence");
        assert_eq!(value[0]["source"], "FILES");
    }
}
