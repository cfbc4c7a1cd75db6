// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Bridge Contract Errors
//!
//! Every violation of a memory bridge contract surfaces as a [`BridgeError`].
//! These are programmer errors (empty layer names, mismatched entries, naive
//! timestamps, duplicate capabilities, unknown lookups) and are never
//! silently corrected.
//!
//! Connector-level soft failures are *not* errors: connectors report them as
//! entries on the [`ALERT_LAYER`](crate::domain::entry::ALERT_LAYER).

use thiserror::Error;

/// Errors raised by layers, the catalog, the witness network and the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Layer name cannot be empty")]
    InvalidName,

    #[error("Entry layer mismatch: layer '{expected}' cannot store an entry for '{actual}'")]
    LayerMismatch { expected: String, actual: String },

    #[error("Timestamp '{0}' must carry timezone information")]
    NaiveTimestamp(String),

    #[error("Timestamp '{0}' is not a valid ISO-8601 value")]
    InvalidTimestamp(String),

    #[error("Function '{0}' is already registered")]
    DuplicateCapability(String),

    #[error("Invalid function spec: {0}")]
    InvalidSpec(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Intelligence node '{node}' failed: {reason}")]
    NodeFailure { node: String, reason: String },
}

impl BridgeError {
    pub(crate) fn node_failure(node: &str, err: anyhow::Error) -> Self {
        BridgeError::NodeFailure {
            node: node.to_string(),
            reason: format!("{err:#}"),
        }
    }
}
