// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `omni catalog`: print the capability catalog

use anyhow::Result;
use std::path::PathBuf;

use super::{build_operator, load_config};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let operator = build_operator(&config)?;

    let functions = operator.bridge().describe_functions();
    println!("{}", serde_json::to_string_pretty(&functions)?);

    Ok(())
}
