// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

// Operator Configuration - Kubernetes-style manifest for the ingestion operator
//
// Defines:
// - Execution policy (sequential vs. bounded worker pool, timeout)
// - Memory layers pre-registered with the bridge
// - Filesystem connectors (FILEBOSS, MEGA-PDF, WhisperX) and static payload connectors

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "omni-engine/v1";
pub const KIND: &str = "OperatorConfig";

/// Top-level operator configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfigManifest {
    /// API version (must be "omni-engine/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "OperatorConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: OperatorConfigSpec,
}

pub type OperatorConfig = OperatorConfigManifest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfigSpec {
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Layers registered with the bridge before the first run
    #[serde(default = "default_memory_layers")]
    pub memory_layers: Vec<String>,

    #[serde(default)]
    pub connectors: ConnectorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Run connectors on a bounded worker pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Overall deadline for one parallel run
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorsConfig {
    #[serde(default)]
    pub fileboss: Option<FileBossConfig>,

    #[serde(default)]
    pub mega_pdf: Option<MegaPdfConfig>,

    #[serde(default)]
    pub whisperx: Option<WhisperXConfig>,

    #[serde(default, rename = "static")]
    pub static_payloads: Vec<StaticConnectorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBossConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_fileboss_name")]
    pub name: String,

    pub root: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MegaPdfConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_mega_pdf_name")]
    pub name: String,

    pub documents_root: PathBuf,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_characters_per_page")]
    pub characters_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperXConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_whisperx_name")]
    pub name: String,

    pub transcripts_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConnectorConfig {
    pub name: String,
    pub layer: String,
    #[serde(default = "default_static_source")]
    pub source: String,
    #[serde(default)]
    pub payloads: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_workers() -> usize {
    4
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_max_pages() -> usize {
    3
}

fn default_characters_per_page() -> usize {
    280
}

fn default_fileboss_name() -> String {
    "FILEBOSS".to_string()
}

fn default_mega_pdf_name() -> String {
    "MEGA_PDF".to_string()
}

fn default_whisperx_name() -> String {
    "WHISPERX".to_string()
}

fn default_static_source() -> String {
    "OPERATOR".to_string()
}

fn default_memory_layers() -> Vec<String> {
    vec![
        "legal_evidence".to_string(),
        "document_insights".to_string(),
        "audio_transcripts".to_string(),
        crate::domain::entry::ALERT_LAYER.to_string(),
    ]
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: default_max_workers(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OperatorConfigSpec {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            memory_layers: default_memory_layers(),
            connectors: ConnectorsConfig::default(),
        }
    }
}

impl Default for OperatorConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "omni-operator".to_string(),
                version: Some("1.0.0".to_string()),
            },
            spec: OperatorConfigSpec::default(),
        }
    }
}

impl OperatorConfigManifest {
    /// Default manifest wired to the conventional `data/` layout under `base`.
    pub fn with_data_dir(base: impl AsRef<Path>) -> Self {
        let data = base.as_ref().join("data");
        let mut config = Self::default();
        config.spec.connectors = ConnectorsConfig {
            fileboss: Some(FileBossConfig {
                enabled: true,
                name: default_fileboss_name(),
                root: data.join("fileboss"),
                layer: None,
            }),
            mega_pdf: Some(MegaPdfConfig {
                enabled: true,
                name: default_mega_pdf_name(),
                documents_root: data.join("pdfs"),
                max_pages: default_max_pages(),
                characters_per_page: default_characters_per_page(),
            }),
            whisperx: Some(WhisperXConfig {
                enabled: true,
                name: default_whisperx_name(),
                transcripts_root: data.join("transcripts"),
            }),
            static_payloads: vec![StaticConnectorConfig {
                name: "SOVEREIGN_ASCENSION_PROTOCOL".to_string(),
                layer: "operational_notes".to_string(),
                source: default_static_source(),
                payloads: vec![
                    "Synchronized memory layers across legal_evidence, document_insights, audio_transcripts.".to_string(),
                    "Maintain 24/7 monitoring and refresh connectors hourly.".to_string(),
                ],
            }],
        };
        config
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. OMNI_CONFIG_PATH environment variable
    /// 2. ./omni-config.yaml (working directory)
    /// 3. ~/.omni/config.yaml (user home)
    /// 4. /etc/omni/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("OMNI_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./omni-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".omni").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/omni/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using ./data defaults.");
            let mut config = Self::with_data_dir(".");
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to the execution policy
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OMNI_PARALLEL_EXECUTION") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::info!("Environment override: OMNI_PARALLEL_EXECUTION=true");
                    self.spec.execution.parallel = true;
                }
                "false" | "0" | "no" | "off" => {
                    tracing::info!("Environment override: OMNI_PARALLEL_EXECUTION=false");
                    self.spec.execution.parallel = false;
                }
                _ => {
                    tracing::warn!("Ignoring invalid OMNI_PARALLEL_EXECUTION value: '{}'", val);
                }
            }
        }

        if let Ok(val) = std::env::var("OMNI_MAX_WORKERS") {
            match val.parse::<usize>() {
                Ok(workers) => self.spec.execution.max_workers = workers,
                Err(_) => tracing::warn!("Ignoring invalid OMNI_MAX_WORKERS value: '{}'", val),
            }
        }

        if let Ok(val) = std::env::var("OMNI_TIMEOUT_SECONDS") {
            match val.parse::<u64>() {
                Ok(seconds) => self.spec.execution.timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid OMNI_TIMEOUT_SECONDS value: '{}'", val),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.trim().is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let execution = &self.spec.execution;
        if execution.max_workers == 0 {
            anyhow::bail!("spec.execution.max_workers must be at least 1");
        }
        if execution.timeout_seconds == 0 {
            anyhow::bail!("spec.execution.timeout_seconds must be at least 1");
        }

        for layer in &self.spec.memory_layers {
            if layer.trim().is_empty() {
                anyhow::bail!("spec.memory_layers cannot contain an empty layer name");
            }
        }

        let mut names = HashSet::new();
        for name in self.connector_names() {
            if name.trim().is_empty() {
                anyhow::bail!("Connector name cannot be empty");
            }
            if !names.insert(name) {
                anyhow::bail!("Duplicate connector name: {}", name);
            }
        }

        for connector in &self.spec.connectors.static_payloads {
            if connector.layer.trim().is_empty() {
                anyhow::bail!("Static connector '{}' must target a layer", connector.name);
            }
        }

        Ok(())
    }

    /// Names of every enabled connector, in construction order.
    pub fn connector_names(&self) -> Vec<&str> {
        let connectors = &self.spec.connectors;
        let mut names = Vec::new();
        if let Some(fileboss) = connectors.fileboss.as_ref().filter(|c| c.enabled) {
            names.push(fileboss.name.as_str());
        }
        if let Some(mega_pdf) = connectors.mega_pdf.as_ref().filter(|c| c.enabled) {
            names.push(mega_pdf.name.as_str());
        }
        if let Some(whisperx) = connectors.whisperx.as_ref().filter(|c| c.enabled) {
            names.push(whisperx.name.as_str());
        }
        names.extend(connectors.static_payloads.iter().map(|c| c.name.as_str()));
        names
    }
}
