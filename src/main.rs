// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use std::env;
use tokio::signal;
use tracing::{info, warn};
use webdiag::{bootstrap::build_services, cache::spawn_cleanup_task, config::ServiceConfig, version};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!(
        "Starting {} {} (built {})",
        version::SERVICE_NAME,
        version::VERSION,
        version::BUILD_DATE
    );

    let config = ServiceConfig::from_env();
    config.validate_for_serving()?;
    let addr = config.server.socket_addr().map_err(|e| anyhow!(e))?;

    let services = build_services(&config)?;

    let cleanup_handle = match config.cache.cleanup_interval() {
        Some(period) => Some(spawn_cleanup_task(
            services.cache.clone(),
            config.cache.retention(),
            period,
        )),
        None => {
            warn!("Cache cleanup disabled (CACHE_CLEANUP_INTERVAL_SECS=0)");
            None
        }
    };

    let state = services.app_state(&config.server.diagnose_path);

    println!("\n{}", "=".repeat(60));
    println!("{} is running", version::SERVICE_NAME);
    println!("  Diagnose:  POST http://{}{}", addr, config.server.diagnose_path);
    println!("  Liveness:  GET  http://{}{}", addr, config.server.diagnose_path);
    println!("  Health:    GET  http://{}/health", addr);
    println!("\nTest with curl:");
    println!(
        "  curl -X POST http://localhost:{}{} \\",
        config.server.port, config.server.diagnose_path
    );
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"url\": \"https://example.com\"}}'");
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", "=".repeat(60));

    webdiag::api::start_server(state, addr, async {
        // Wait for shutdown signal
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    })
    .await?;

    // Cleanup
    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    info!("Goodbye");
    Ok(())
}
