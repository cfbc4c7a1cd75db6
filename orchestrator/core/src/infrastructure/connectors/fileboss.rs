// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! FILEBOSS connector: indexes every file under a working directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::connector::Connector;
use crate::domain::entry::MemoryEntry;

use super::scan;

pub const DEFAULT_LAYER: &str = "legal_evidence";
pub const DEFAULT_SOURCE: &str = "FILEBOSS";

#[derive(Debug, Clone)]
pub struct FileBossConnector {
    name: String,
    root: PathBuf,
    layer: String,
    source: String,
}

impl FileBossConnector {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            layer: DEFAULT_LAYER.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Connector for FileBossConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        let connector = self.clone();
        let entries = tokio::task::spawn_blocking(move || connector.index()).await?;
        Ok(entries)
    }
}

impl FileBossConnector {
    fn index(&self) -> Vec<MemoryEntry> {
        let (files, alerts) = scan(&self.root, &self.source, |_| true);
        debug!("FILEBOSS indexed {} files under {:?}", files.len(), self.root);

        let mut entries: Vec<MemoryEntry> = files
            .iter()
            .map(|path| {
                let relative = path.strip_prefix(&self.root).unwrap_or(path);
                MemoryEntry::new(
                    &self.layer,
                    format!("Indexed file: {}", relative.display()),
                    &self.source,
                )
            })
            .collect();

        entries.extend(alerts);
        entries
    }
}
