// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Memory Entry
//!
//! The immutable unit of stored information. An entry names the layer it
//! belongs to, an opaque content payload, a provenance tag and the instant it
//! was captured (UTC, defaulting to "now" at construction).
//!
//! Fields are private: once built, an entry cannot be mutated. Consumers that
//! need a wire shape use [`EntryRecord`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::BridgeError;

/// Reserved layer name for connector-reported soft failures.
///
/// Connectors write an entry here instead of failing when an input is
/// unreadable or an optional capability is unavailable. The orchestrator
/// collects these as alerts when auditing a run.
pub const ALERT_LAYER: &str = "ingestion_alerts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    layer: String,
    content: String,
    source: String,
    timestamp: DateTime<Utc>,
}

impl MemoryEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(layer: impl Into<String>, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self::with_timestamp(layer, content, source, Utc::now())
    }

    pub fn with_timestamp(
        layer: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            layer: layer.into(),
            content: content.into(),
            source: source.into(),
            timestamp,
        }
    }

    /// Shorthand for a soft-failure entry on [`ALERT_LAYER`].
    pub fn alert(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(ALERT_LAYER, content, source)
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_alert(&self) -> bool {
        self.layer == ALERT_LAYER
    }

    pub fn to_record(&self) -> EntryRecord {
        EntryRecord {
            layer: self.layer.clone(),
            content: self.content.clone(),
            source: self.source.clone(),
            timestamp: self.timestamp.to_rfc3339(),
        }
    }
}

/// Serialized form of a [`MemoryEntry`] handed to dashboards and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub layer: String,
    pub content: String,
    pub source: String,
    /// RFC 3339 / ISO-8601 with explicit offset
    pub timestamp: String,
}

impl From<&MemoryEntry> for EntryRecord {
    fn from(entry: &MemoryEntry) -> Self {
        entry.to_record()
    }
}

/// Parse an ISO-8601 lower bound for time-range queries.
///
/// The value must carry an offset. A well-formed timestamp without one is
/// rejected with [`BridgeError::NaiveTimestamp`] rather than being assumed UTC;
/// anything else is [`BridgeError::InvalidTimestamp`].
pub fn parse_since(raw: &str) -> Result<DateTime<Utc>, BridgeError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok();

    if naive {
        Err(BridgeError::NaiveTimestamp(raw.to_string()))
    } else {
        Err(BridgeError::InvalidTimestamp(raw.to_string()))
    }
}
