// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and contracts for the memory bridge. No I/O beyond
//! configuration file loading.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`entry`] | `MemoryEntry`, `EntryRecord`, `ALERT_LAYER` |
//! | [`layer`] | `MemoryLayer`, `LayerResolver` |
//! | [`catalog`] | `FunctionSpec`, `McpCatalog` |
//! | [`node`] | `IntelligenceNode` |
//! | [`connector`] | `Connector` |
//! | [`audit`] | `ConnectorAudit`, `AuditReport`, `ConnectorExecution` |
//! | [`config`] | `OperatorConfig` |
//! | [`error`] | `BridgeError` |

pub mod audit;
pub mod catalog;
pub mod config;
pub mod connector;
pub mod entry;
pub mod error;
pub mod layer;
pub mod node;
