// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod bridge;
pub mod fusion;
pub mod operator;
pub mod recommendations;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::MemoryBridge;
pub use fusion::FusionLoop;
pub use operator::{ExecutionPolicy, OperatorCore, OrchestrationMetrics};
pub use recommendations::generate_recommendations;
pub use report::render_markdown;
