// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `omni-core`: Memory Bridge and Connector Orchestration
//!
//! Ingests heterogeneous evidence into a layered in-memory store, fans updates
//! out to intelligence nodes and audits connector runs.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | entries, layers, catalog, node/connector contracts, audits, config |
//! | [`infrastructure`] | Infrastructure | witness network, layer store, concrete connectors |
//! | [`application`] | Application | fusion loop, memory bridge, operator, recommendations, reports |
//!
//! Nothing is persisted: entries live for the lifetime of the owning bridge.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
