// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use tracing::info;

use crate::api::DiagnoseApiResponse;
use crate::auth::resolve_context;
use crate::bootstrap::build_services;
use crate::config::ServiceConfig;

/// Arguments for the diagnose command
#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Page to diagnose
    #[arg(long)]
    pub url: String,

    /// Bearer token; without one the report is redacted
    #[arg(long, env = "WEBDIAG_TOKEN")]
    pub token: Option<String>,

    /// Print the API response JSON instead of the report text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the purge command
#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Retention in days (defaults to CACHE_RETENTION_DAYS)
    #[arg(long)]
    pub older_than_days: Option<u32>,
}

/// Diagnose one URL through the same pipeline the server uses
pub async fn run_diagnose(args: DiagnoseArgs) -> Result<()> {
    let config = ServiceConfig::from_env();
    config.validate_for_serving()?;
    let services = build_services(&config)?;

    let auth = resolve_context(services.identity.as_ref(), args.token.as_deref()).await;
    if args.token.is_some() && !auth.is_authenticated {
        eprintln!("⚠️  Token rejected; continuing with a redacted report");
    }

    let outcome = services
        .diagnosis
        .diagnose(&args.url, &auth)
        .await
        .map_err(|e| anyhow!("{} ({}): {}", e.user_message(), e.code(), e))?;

    if args.json {
        let response = DiagnoseApiResponse::from(outcome);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        if outcome.cached {
            eprintln!("(served from cache)");
        }
        println!("{}", outcome.result);
    }
    Ok(())
}

/// Run one retention cleanup pass
pub async fn run_purge(args: PurgeArgs) -> Result<()> {
    let config = ServiceConfig::from_env();
    config.validate()?;
    let services = build_services(&config)?;

    let days = args.older_than_days.unwrap_or(config.cache.retention_days);
    if days == 0 {
        return Err(anyhow!("--older-than-days must be at least 1"));
    }

    let removed = services
        .cache
        .purge_older_than(Duration::from_secs(u64::from(days) * 86_400))
        .await?;

    info!("Purged {} records older than {} days", removed, days);
    println!("Removed {} cached diagnoses older than {} days", removed, days);
    Ok(())
}
