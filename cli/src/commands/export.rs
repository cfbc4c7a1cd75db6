// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `omni export`: run a cycle and dump one layer

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::{build_operator, load_config};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Memory layer to export
    #[arg(value_name = "LAYER")]
    pub layer: String,

    /// Only entries at or after this ISO-8601 timestamp (offset required)
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,
}

pub async fn execute(args: ExportArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let operator = build_operator(&config)?;
    operator.run_cycle().await;

    let json = operator
        .bridge()
        .export_layer_json(&args.layer, args.since.as_deref())
        .with_context(|| format!("Failed to export layer '{}'", args.layer))?;
    println!("{}", json);

    Ok(())
}
