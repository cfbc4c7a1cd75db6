// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

// Witness Network - Broadcast bus for memory updates
//
// Records every broadcast entry in an append-only log and fans it out:
// - synchronously to registered intelligence nodes (origin excluded)
// - to passive observers (dashboards) through a tokio broadcast channel
//
// In-memory only: the log is lost when the process exits.

use crate::domain::entry::MemoryEntry;
use crate::domain::error::BridgeError;
use crate::domain::node::IntelligenceNode;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event delivered to passive observers for every broadcast entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessEvent {
    pub entry: MemoryEntry,
    /// Name of the node that produced the entry, if any
    pub origin: Option<String>,
}

/// Event bus recording and broadcasting memory updates.
///
/// Nodes are held weakly: the network never keeps a node alive, and nodes
/// dropped by their owner are pruned on the next broadcast. Registering the
/// same node twice is a no-op.
pub struct WitnessNetwork {
    log: RwLock<Vec<MemoryEntry>>,
    subscribers: RwLock<Vec<Weak<dyn IntelligenceNode>>>,
    sender: broadcast::Sender<WitnessEvent>,
}

impl WitnessNetwork {
    /// Create a witness network whose observer channel buffers `capacity`
    /// events before lagging observers start losing the oldest ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            log: RwLock::new(Vec::new()),
            subscribers: RwLock::new(Vec::new()),
            sender,
        }
    }

    /// Create witness network with default observer capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Register `node` to receive broadcast updates
    pub fn register(&self, node: &Arc<dyn IntelligenceNode>) {
        let mut subscribers = self.subscribers.write();
        let address = node_address(&**node);
        let known = subscribers
            .iter()
            .any(|existing| existing.as_ptr() as *const () == address);

        if known {
            debug!("Node '{}' already registered with witness network", node.name());
            return;
        }
        subscribers.push(Arc::downgrade(node));
    }

    /// Record `entry` and deliver it to every live node except `origin`.
    ///
    /// Delivery runs in registration order. The first node whose
    /// `apply_update` fails stops the fan-out and the error is returned; the
    /// entry stays in the log regardless.
    pub fn broadcast(
        &self,
        entry: &MemoryEntry,
        origin: Option<&dyn IntelligenceNode>,
    ) -> Result<usize, BridgeError> {
        self.log.write().push(entry.clone());
        self.publish(WitnessEvent {
            entry: entry.clone(),
            origin: origin.map(|node| node.name().to_string()),
        });

        let origin_address = origin.map(node_address);
        let mut delivered = 0;

        for node in self.live_subscribers() {
            if Some(node_address(&*node)) == origin_address {
                continue;
            }
            debug!("Delivering entry on layer '{}' to node '{}'", entry.layer(), node.name());
            node.apply_update(entry)
                .map_err(|e| BridgeError::node_failure(node.name(), e))?;
            delivered += 1;
        }

        Ok(delivered)
    }

    /// Snapshot of every entry broadcast so far, in broadcast order
    pub fn log(&self) -> Vec<MemoryEntry> {
        self.log.read().clone()
    }

    /// Get the number of live registered nodes
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .iter()
            .filter(|node| node.strong_count() > 0)
            .count()
    }

    /// Subscribe a passive observer to all future broadcasts
    pub fn subscribe(&self) -> WitnessReceiver {
        WitnessReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Get the number of active observers
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn publish(&self, event: WitnessEvent) {
        // send() only fails when nobody is listening
        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No observers listening to witness network");
        }
    }

    fn live_subscribers(&self) -> Vec<Arc<dyn IntelligenceNode>> {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|node| node.strong_count() > 0);
        subscribers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Default for WitnessNetwork {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

fn node_address(node: &dyn IntelligenceNode) -> *const () {
    node as *const dyn IntelligenceNode as *const ()
}

/// Receiver for witness events
pub struct WitnessReceiver {
    receiver: broadcast::Receiver<WitnessEvent>,
}

impl WitnessReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<WitnessEvent, WitnessError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => WitnessError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Witness observer lagged by {} events", n);
                WitnessError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<WitnessEvent, WitnessError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => WitnessError::Empty,
            broadcast::error::TryRecvError::Closed => WitnessError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Witness observer lagged by {} events", n);
                WitnessError::Lagged(n)
            }
        })
    }
}

/// Errors that can occur when receiving witness events
#[derive(Debug, thiserror::Error)]
pub enum WitnessError {
    #[error("Witness network is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Observer lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
