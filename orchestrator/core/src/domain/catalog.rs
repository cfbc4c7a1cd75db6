// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Catalog
//!
//! A registry of [`FunctionSpec`] descriptions so external agents and
//! dashboards can discover what the bridge can be asked for without
//! hardcoding layer names.
//!
//! | Operation | Failure |
//! |-----------|---------|
//! | `register(spec, false)` on a known name | `DuplicateCapability` |
//! | `remove` / `get` on an unknown name | `NotFound` |
//!
//! Specs are kept in a name-ordered map, so [`McpCatalog::describe`] is
//! deterministic for a given catalog state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::error::BridgeError;

/// Metadata describing a callable capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    name: String,
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
    tags: Vec<String>,
}

impl FunctionSpec {
    /// Build a spec with a trimmed, non-empty name and a non-empty description.
    pub fn new(name: &str, description: &str) -> Result<Self, BridgeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BridgeError::InvalidSpec("function name cannot be empty".to_string()));
        }
        if description.trim().is_empty() {
            return Err(BridgeError::InvalidSpec(format!(
                "function '{}' must have a description",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            tags: Vec::new(),
        })
    }

    pub fn with_input(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), description.into());
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), description.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn inputs(&self) -> &BTreeMap<String, String> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, String> {
        &self.outputs
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Registry of callable descriptions, keyed by spec name.
#[derive(Debug, Default)]
pub struct McpCatalog {
    functions: BTreeMap<String, FunctionSpec>,
}

impl McpCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` under its name; `replace` allows overwriting.
    pub fn register(&mut self, spec: FunctionSpec, replace: bool) -> Result<(), BridgeError> {
        if !replace && self.functions.contains_key(spec.name()) {
            return Err(BridgeError::DuplicateCapability(spec.name().to_string()));
        }
        self.functions.insert(spec.name().to_string(), spec);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<FunctionSpec, BridgeError> {
        self.functions
            .remove(name)
            .ok_or_else(|| BridgeError::NotFound(format!("function '{}'", name)))
    }

    pub fn get(&self, name: &str) -> Result<&FunctionSpec, BridgeError> {
        self.functions
            .get(name)
            .ok_or_else(|| BridgeError::NotFound(format!("function '{}'", name)))
    }

    /// All registered specs, ordered by name.
    pub fn describe(&self) -> Vec<FunctionSpec> {
        self.functions.values().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }
}
