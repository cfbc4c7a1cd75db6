// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod connectors;
pub mod layer_store;
pub mod witness;

pub use layer_store::LayerStore;
pub use witness::{WitnessError, WitnessEvent, WitnessNetwork, WitnessReceiver};
