//! `sync`: keep the match tables reconciled with the upstream feed.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{error, info};

use super::shutdown_signal;
use crate::config::Config;
use crate::goalserve::{FeedSource, GoalserveClient};
use crate::models::Sport;
use crate::storage::{MatchStore, PgStore};
use crate::sync::{Scheduler, SyncService};

/// Run the scheduler until a shutdown signal, or one cycle per sport with `once`.
///
/// With `backfill`, the past week is re-read for every sport first.
pub async fn run(
    config: &Config,
    store: Arc<PgStore>,
    once: bool,
    backfill: bool,
) -> anyhow::Result<()> {
    if config.goalserve_api_key.trim().is_empty() {
        bail!("GOALSERVE_API_KEY must be set to run sync");
    }

    let feed: Arc<dyn FeedSource> = Arc::new(
        GoalserveClient::new(
            &config.goalserve_url,
            config.goalserve_api_key.clone(),
            config.feed_timeout(),
            config.feed_request_spacing(),
        )
        .context("failed to build the feed client")?,
    );
    let store: Arc<dyn MatchStore> = store;

    // One client for every sport, so request spacing holds across loops.
    let services: Vec<Arc<SyncService>> = Sport::ALL
        .into_iter()
        .map(|sport| Arc::new(SyncService::new(sport, feed.clone(), store.clone())))
        .collect();

    if backfill {
        for service in &services {
            service.run_backfill().await;
        }
    }

    if once {
        let mut failed = 0;
        let mut written = 0;
        for service in &services {
            match service.run_cycle().await {
                Ok(outcome) => written += outcome.succeeded(),
                Err(e) => {
                    error!(sport = %service.sport(), error = %e, "Sync cycle failed");
                    failed += 1;
                }
            }
        }
        info!(records = written, failed_sports = failed, "One-shot sync finished");
        if failed > 0 {
            bail!("{failed} sport(s) failed to sync");
        }
        return Ok(());
    }

    Scheduler::new(services, config.sync_interval(), config.shutdown_grace())
        .run(shutdown_signal())
        .await;

    Ok(())
}
