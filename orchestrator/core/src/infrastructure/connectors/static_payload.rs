// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::connector::Connector;
use crate::domain::entry::MemoryEntry;

/// Emits a fixed list of payloads onto one layer.
///
/// Every entry from one `gather` call shares the same timestamp.
#[derive(Debug, Clone)]
pub struct StaticConnector {
    name: String,
    layer: String,
    source: String,
    payloads: Vec<String>,
}

impl StaticConnector {
    pub fn new(
        name: impl Into<String>,
        layer: impl Into<String>,
        payloads: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            layer: layer.into(),
            source: "OPERATOR".to_string(),
            payloads: payloads.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[async_trait]
impl Connector for StaticConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        let timestamp = Utc::now();
        Ok(self
            .payloads
            .iter()
            .map(|payload| MemoryEntry::with_timestamp(&self.layer, payload, &self.source, timestamp))
            .collect())
    }
}
