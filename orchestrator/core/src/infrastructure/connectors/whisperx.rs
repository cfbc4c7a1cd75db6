// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! WhisperX connector: forwards pre-generated transcripts as memories.
//!
//! | File | Entries |
//! |------|---------|
//! | `*.json` | one per non-blank segment: `<stem> [<start>-<end>] <speaker>: <text>` |
//! | `*.txt`, `*.vtt` | one per file: `<stem>: <text>` |
//!
//! A JSON file that fails to parse becomes an alert; other files are ignored.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::connector::Connector;
use crate::domain::entry::MemoryEntry;

use super::{extension, file_name, scan};

pub const DEFAULT_LAYER: &str = "audio_transcripts";
pub const DEFAULT_SOURCE: &str = "WHISPERX";

#[derive(Debug, Default, Deserialize)]
struct WhisperXPayload {
    #[serde(default)]
    segments: Option<Vec<Segment>>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default = "default_speaker")]
    speaker: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
}

fn default_speaker() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone)]
pub struct WhisperXConnector {
    name: String,
    transcripts_root: PathBuf,
    layer: String,
    source: String,
}

impl WhisperXConnector {
    pub fn new(name: impl Into<String>, transcripts_root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            transcripts_root: transcripts_root.into(),
            layer: DEFAULT_LAYER.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    pub fn transcripts_root(&self) -> &Path {
        &self.transcripts_root
    }

    fn load(&self) -> Vec<MemoryEntry> {
        let (transcripts, alerts) = scan(&self.transcripts_root, &self.source, |path| {
            matches!(extension(path).as_deref(), Some("json" | "txt" | "vtt"))
        });

        let mut entries = Vec::new();
        for transcript in transcripts {
            match extension(&transcript).as_deref() {
                Some("json") => entries.extend(self.segment_entries(&transcript)),
                _ => entries.push(self.text_entry(&transcript)),
            }
        }
        entries.extend(alerts);
        entries
    }

    fn segment_entries(&self, path: &Path) -> Vec<MemoryEntry> {
        let payload = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<WhisperXPayload>(&raw).map_err(Into::into));

        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                return vec![MemoryEntry::alert(
                    format!("Failed to parse {}: {e}", file_name(path)),
                    &self.source,
                )]
            }
        };

        let stem = stem(path);
        payload
            .segments
            .unwrap_or_default()
            .into_iter()
            .filter_map(|segment| {
                let text = segment.text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(MemoryEntry::new(
                    &self.layer,
                    format!(
                        "{stem} [{:.2}-{:.2}] {}: {text}",
                        segment.start, segment.end, segment.speaker
                    ),
                    &self.source,
                ))
            })
            .collect()
    }

    fn text_entry(&self, path: &Path) -> MemoryEntry {
        match std::fs::read_to_string(path) {
            Ok(text) => MemoryEntry::new(
                &self.layer,
                format!("{}: {}", stem(path), text.trim()),
                &self.source,
            ),
            Err(e) => MemoryEntry::alert(
                format!("Failed to read {}: {e}", file_name(path)),
                &self.source,
            ),
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl Connector for WhisperXConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn gather(&self) -> anyhow::Result<Vec<MemoryEntry>> {
        let connector = self.clone();
        let entries = tokio::task::spawn_blocking(move || connector.load()).await?;
        Ok(entries)
    }
}
