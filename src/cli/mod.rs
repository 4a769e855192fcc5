// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod diagnose;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Webdiag operator CLI
#[derive(Parser, Debug)]
#[command(name = "webdiag-cli")]
#[command(version)]
#[command(about = "Operator tools for the webdiag service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full diagnosis pipeline once and print the report
    Diagnose(diagnose::DiagnoseArgs),

    /// Delete cached diagnoses past the retention window
    Purge(diagnose::PurgeArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Diagnose(args) => diagnose::run_diagnose(args).await,
        Commands::Purge(args) => diagnose::run_purge(args).await,
    }
}
