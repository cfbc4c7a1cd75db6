// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! MEGA-PDF connector: page snippets from PDF documents.
//!
//! Text extraction is behind the `pdf` cargo feature. A build without it still
//! registers the connector, which then reports a single alert per run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::connector::Connector;
use crate::domain::entry::MemoryEntry;

pub const DEFAULT_LAYER: &str = "document_insights";
pub const DEFAULT_SOURCE: &str = "MEGA_PDF";

#[derive(Debug, Clone)]
pub struct MegaPdfConnector {
    name: String,
    documents_root: PathBuf,
    layer: String,
    source: String,
    max_pages: usize,
    characters_per_page: usize,
}

impl MegaPdfConnector {
    pub fn new(name: impl Into<String>, documents_root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            documents_root: documents_root.into(),
            layer: DEFAULT_LAYER.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            max_pages: 3,
            characters_per_page: 280,
        }
    }

    /// Limit extraction to the first `max_pages` pages, `characters_per_page` chars each.
    pub fn with_limits(mut self, max_pages: usize, characters_per_page: usize) -> Self {
        self.max_pages = max_pages;
        self.characters_per_page = characters_per_page;
        self
    }

    pub fn documents_root(&self) -> &Path {
        &self.documents_root
    }
}

#[async_trait]
impl Connector for MegaPdfConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        let connector = self.clone();
        let entries = tokio::task::spawn_blocking(move || connector.extract()).await?;
        Ok(entries)
    }
}

impl MegaPdfConnector {
    #[cfg(not(feature = "pdf"))]
    fn extract(&self) -> Vec<MemoryEntry> {
        tracing::warn!("Connector '{}' built without the `pdf` feature", self.name);
        vec![MemoryEntry::alert(
            "PDF extraction support is not enabled; PDF analysis skipped.",
            &self.source,
        )]
    }

    #[cfg(feature = "pdf")]
    fn extract(&self) -> Vec<MemoryEntry> {
        use super::{extension, file_name, scan};

        let (documents, alerts) = scan(&self.documents_root, &self.source, |path| {
            extension(path).as_deref() == Some("pdf")
        });

        let mut entries = Vec::new();
        for pdf in documents {
            let name = file_name(&pdf);
            match pdf_extract::extract_text_by_pages(&pdf) {
                Ok(pages) => entries.extend(self.page_entries(&name, &pages)),
                Err(e) => entries.push(MemoryEntry::alert(
                    format!("Failed to read {name}: {e}"),
                    &self.source,
                )),
            }
        }
        entries.extend(alerts);
        entries
    }

    /// One entry per non-blank page among the first `max_pages`.
    #[cfg_attr(not(feature = "pdf"), allow(dead_code))]
    fn page_entries(&self, document: &str, pages: &[String]) -> Vec<MemoryEntry> {
        pages
            .iter()
            .take(self.max_pages)
            .enumerate()
            .filter_map(|(index, text)| {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                let snippet: String = text.chars().take(self.characters_per_page).collect();
                Some(MemoryEntry::new(
                    &self.layer,
                    format!("{document}#page{}: {snippet}", index + 1),
                    &self.source,
                ))
            })
            .collect()
    }
}
