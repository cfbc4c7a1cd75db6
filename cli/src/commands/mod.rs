// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Omni Engine CLI

pub mod catalog;
pub mod config;
pub mod export;
pub mod run;

pub use self::config::ConfigCommand;
pub use self::export::ExportArgs;
pub use self::run::RunArgs;

use anyhow::{Context, Result};
use std::path::PathBuf;

use omni_core::application::OperatorCore;
use omni_core::config::OperatorConfig;

/// Load and validate the operator configuration.
pub fn load_config(config_path: Option<PathBuf>) -> Result<OperatorConfig> {
    let config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Build an operator from the discovered configuration.
pub fn build_operator(config: &OperatorConfig) -> Result<OperatorCore> {
    OperatorCore::from_config(config).context("Failed to build operator from configuration")
}
