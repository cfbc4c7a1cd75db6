// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Fusion Loop
//!
//! One synchronization pass: poll each node once, append its entries to their
//! layers and broadcast each one through the witness network with the node as
//! origin. Nodes are visited in slice order and each node's entries keep the
//! order `fetch_updates` returned them in.
//!
//! A cycle does not loop or retry. The first failure (a node that cannot be
//! polled, an entry that cannot be stored, a node that rejects a broadcast)
//! stops the pass; work done before it stays applied.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::error::BridgeError;
use crate::domain::layer::LayerResolver;
use crate::domain::node::IntelligenceNode;
use crate::infrastructure::witness::WitnessNetwork;

pub struct FusionLoop<'a> {
    layers: &'a dyn LayerResolver,
    witnesses: &'a WitnessNetwork,
}

impl<'a> FusionLoop<'a> {
    pub fn new(layers: &'a dyn LayerResolver, witnesses: &'a WitnessNetwork) -> Self {
        Self { layers, witnesses }
    }

    /// Run one pass over `nodes`, returning how many entries were fused.
    pub fn cycle(&self, nodes: &[Arc<dyn IntelligenceNode>]) -> Result<usize, BridgeError> {
        let mut fused = 0;

        for node in nodes {
            let updates = node
                .fetch_updates()
                .map_err(|e| BridgeError::node_failure(node.name(), e))?;
            debug!("Node '{}' returned {} updates", node.name(), updates.len());

            for entry in updates {
                let layer = self.layers.resolve_layer(entry.layer())?;
                layer.add(entry.clone())?;
                self.witnesses.broadcast(&entry, Some(&**node))?;
                fused += 1;
            }
        }

        info!("Fusion cycle over {} nodes fused {} entries", nodes.len(), fused);
        Ok(fused)
    }
}
