// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Periodic retention cleanup

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::gateway::CacheGateway;

/// Run one cleanup pass; failures are logged only
pub async fn run_cleanup_once(gateway: &CacheGateway, retention: Duration) -> Option<u64> {
    match gateway.purge_older_than(retention).await {
        Ok(removed) => {
            if removed > 0 {
                info!("Cache cleanup removed {} expired records", removed);
            } else {
                debug!("Cache cleanup found nothing to remove");
            }
            Some(removed)
        }
        Err(e) => {
            warn!(error = %e, "Cache cleanup failed");
            None
        }
    }
}

/// Spawn a task purging records older than `retention` every `period`
pub fn spawn_cleanup_task(
    gateway: CacheGateway,
    retention: Duration,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task: retention={}d, period={}s",
            retention.as_secs() / 86_400,
            period.as_secs()
        );
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_cleanup_once(&gateway, retention).await;
        }
    })
}
