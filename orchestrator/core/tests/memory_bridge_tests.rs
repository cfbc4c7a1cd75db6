// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the memory bridge facade.
//!
//! Covers the properties external callers rely on:
//! - layer registration is idempotent and keeps one catalog spec per layer
//! - fusion stores node output in order and never echoes it to its origin
//! - time-range exports insist on offset-aware timestamps
//! - witness observers see every broadcast

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use omni_core::application::MemoryBridge;
use omni_core::catalog::FunctionSpec;
use omni_core::entry::MemoryEntry;
use omni_core::error::BridgeError;
use omni_core::node::IntelligenceNode;
use parking_lot::Mutex;

struct Node {
    name: String,
    outbox: Mutex<Vec<MemoryEntry>>,
    inbound: Mutex<Vec<MemoryEntry>>,
}

impl Node {
    fn new(name: &str, outbox: Vec<MemoryEntry>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outbox: Mutex::new(outbox),
            inbound: Mutex::new(Vec::new()),
        })
    }

    fn inbound(&self) -> Vec<MemoryEntry> {
        self.inbound.lock().clone()
    }
}

impl IntelligenceNode for Node {
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

struct UnreachableNode;

impl IntelligenceNode for UnreachableNode {
    fn name(&self) -> &str {
        "UNREACHABLE"
    }

    fn fetch_updates(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        anyhow::bail!("connection refused")
    }

    fn apply_update(&self, _entry: &MemoryEntry) -> anyhow::Result<()> {
        Ok(())
    }
}

fn dyn_node(node: &Arc<Node>) -> Arc<dyn IntelligenceNode> {
    node.clone()
}

#[test]
fn test_register_layer_twice_keeps_one_store_and_one_spec() {
    let bridge = MemoryBridge::new();

    for name in ["legal_evidence", "audio_transcripts", "case 42 notes"] {
        let first = bridge.register_layer(name).unwrap();
        let second = bridge.register_layer(name).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let expected = format!("memory.fetch_{name}");
        let matching = bridge
            .describe_functions()
            .iter()
            .filter(|spec| spec.name() == expected)
            .count();
        assert_eq!(matching, 1);
    }

    assert_eq!(bridge.describe_functions().len(), 3);
}

#[test]
fn test_fusion_property() {
    let bridge = MemoryBridge::new();
    let e1 = MemoryEntry::new("legal_evidence", "exhibit A", "A");
    let e2 = MemoryEntry::new("legal_evidence", "exhibit B", "A");
    let a = Node::new("A", vec![e1.clone(), e2.clone()]);
    let b = Node::new("B", Vec::new());
    bridge.register_node(&dyn_node(&a));
    bridge.register_node(&dyn_node(&b));

    bridge.sync(&[dyn_node(&a), dyn_node(&b)]).unwrap();

    assert_eq!(
        bridge.get_layer("legal_evidence").unwrap().all(),
        vec![e1.clone(), e2.clone()]
    );
    assert!(a.inbound().is_empty());
    assert_eq!(b.inbound(), vec![e1.clone(), e2.clone()]);
    assert_eq!(bridge.witnesses().log(), vec![e1, e2]);
}

#[test]
fn test_fusion_across_nodes_follows_slice_order() {
    let bridge = MemoryBridge::new();
    let a = Node::new("A", vec![MemoryEntry::new("legal_evidence", "from A", "A")]);
    let b = Node::new("B", vec![MemoryEntry::new("legal_evidence", "from B", "B")]);
    bridge.register_node(&dyn_node(&a));
    bridge.register_node(&dyn_node(&b));

    bridge.sync(&[dyn_node(&b), dyn_node(&a)]).unwrap();

    let contents: Vec<String> = bridge
        .get_layer("legal_evidence")
        .unwrap()
        .all()
        .iter()
        .map(|entry| entry.content().to_string())
        .collect();
    assert_eq!(contents, vec!["from B", "from A"]);
    assert_eq!(a.inbound()[0].content(), "from B");
    assert_eq!(b.inbound()[0].content(), "from A");
}

#[test]
fn test_node_poll_failure_is_reported() {
    let bridge = MemoryBridge::new();
    let nodes: Vec<Arc<dyn IntelligenceNode>> = vec![Arc::new(UnreachableNode)];

    let err = bridge.sync(&nodes).unwrap_err();

    assert_eq!(
        err,
        BridgeError::NodeFailure {
            node: "UNREACHABLE".to_string(),
            reason: "connection refused".to_string(),
        }
    );
}

#[test]
fn test_query_returns_subset_in_insertion_order() {
    let bridge = MemoryBridge::new();
    let layer = bridge.register_layer("legal_evidence").unwrap();
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let offsets = [5, 1, 3, 0, 4];
    for (i, hours) in offsets.iter().enumerate() {
        layer
            .add(MemoryEntry::with_timestamp(
                "legal_evidence",
                format!("entry-{i}"),
                "sensor",
                base + Duration::hours(*hours),
            ))
            .unwrap();
    }

    let since = base + Duration::hours(3);
    let selected: Vec<String> = layer
        .query(Some(since))
        .iter()
        .map(|entry| entry.content().to_string())
        .collect();

    assert_eq!(selected, vec!["entry-0", "entry-2", "entry-4"]);
}

#[test]
fn test_export_rejects_naive_and_malformed_since() {
    let bridge = MemoryBridge::with_layers(["legal_evidence"]).unwrap();

    assert!(matches!(
        bridge.export_layer("legal_evidence", Some("2024-06-01 09:00:00")),
        Err(BridgeError::NaiveTimestamp(_))
    ));
    assert!(matches!(
        bridge.export_layer("legal_evidence", Some("last tuesday")),
        Err(BridgeError::InvalidTimestamp(_))
    ));
    assert!(bridge
        .export_layer("legal_evidence", Some("2024-06-01T09:00:00-05:00"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_additional_capabilities_respect_replace_flag() {
    let bridge = MemoryBridge::new();
    let spec = FunctionSpec::new("evidence.summarize", "Summarize a case file.").unwrap();

    bridge.register_function(spec.clone(), false).unwrap();
    assert_eq!(
        bridge.register_function(spec.clone(), false),
        Err(BridgeError::DuplicateCapability("evidence.summarize".to_string()))
    );

    let updated = FunctionSpec::new("evidence.summarize", "Summarize any document.").unwrap();
    bridge.register_function(updated, true).unwrap();
    assert_eq!(
        bridge.describe_functions()[0].description(),
        "Summarize any document."
    );
}

#[tokio::test]
async fn test_observers_follow_fusion_broadcasts() {
    let bridge = MemoryBridge::new();
    let mut observer = bridge.witnesses().subscribe();
    let a = Node::new("A", vec![MemoryEntry::new("audio_transcripts", "call", "A")]);

    bridge.sync(&[dyn_node(&a)]).unwrap();

    let event = observer.recv().await.unwrap();
    assert_eq!(event.entry.content(), "call");
    assert_eq!(event.origin.as_deref(), Some("A"));
}
