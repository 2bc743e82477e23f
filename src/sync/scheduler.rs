//! Periodic reconciliation, one independent loop per sport.
//!
//! Each loop runs a cycle immediately, then on every tick of its interval. A
//! cycle is awaited inside the loop, so a sport never runs two cycles at once;
//! ticks missed while a cycle was running are skipped rather than replayed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{error, info, warn};

use super::SyncService;

pub struct Scheduler {
    services: Vec<Arc<SyncService>>,
    period: Duration,
    grace: Duration,
}

impl Scheduler {
    pub fn new(services: Vec<Arc<SyncService>>, period: Duration, grace: Duration) -> Self {
        Self {
            services,
            period,
            grace,
        }
    }

    /// Run every sport loop until `shutdown` resolves.
    ///
    /// After the signal, loops get `grace` to finish their current cycle; any
    /// still running after that are aborted.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let mut loops = JoinSet::new();

        for service in self.services {
            info!(sport = %service.sport(), period_secs = self.period.as_secs(), "Starting sync loop");
            loops.spawn(sport_loop(service, self.period, shutdown_tx.subscribe()));
        }

        shutdown.await;
        info!("Shutdown requested, stopping sync loops");
        let _ = shutdown_tx.send(());

        let drained = timeout(self.grace, async {
            while let Some(joined) = loops.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Sync loop terminated abnormally");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = loops.len(),
                grace_secs = self.grace.as_secs(),
                "Sync loops still running after grace period, aborting"
            );
            loops.abort_all();
            while loops.join_next().await.is_some() {}
        }

        info!("Sync loops stopped");
    }
}

async fn sport_loop(
    service: Arc<SyncService>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let sport = service.sport();
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            _ = tick.tick() => {}
        }

        if let Err(e) = service.run_cycle().await {
            error!(sport = %sport, error = %e, "Sync cycle failed");
        }
    }

    info!(sport = %sport, "Sync loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goalserve::{FeedError, FeedSource, FeedWindow};
    use crate::models::Sport;
    use crate::storage::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    /// Counts today-window fetches; each one takes `delay` (or never ends).
    struct SlowFeed {
        delay: Option<Duration>,
        cycles: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowFeed {
        fn new(delay: Option<Duration>) -> Arc<Self> {
            Arc::new(Self {
                delay,
                cycles: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FeedSource for SlowFeed {
        async fn fetch_scores(&self, _sport: Sport, window: FeedWindow) -> Result<Value, FeedError> {
            if window == FeedWindow::Today {
                self.cycles.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                match self.delay {
                    Some(delay) => sleep(delay).await,
                    None => std::future::pending::<()>().await,
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(json!({ "category": [] }))
        }
    }

    fn scheduler(feed: Arc<SlowFeed>, period: Duration, grace: Duration) -> Scheduler {
        let store = Arc::new(MemoryStore::new());
        let services = vec![Arc::new(SyncService::new(Sport::Soccer, feed, store))];
        Scheduler::new(services, period, grace)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_and_then_every_period() {
        let feed = SlowFeed::new(Some(Duration::ZERO));
        let scheduler = scheduler(feed.clone(), Duration::from_secs(60), Duration::from_secs(5));

        scheduler.run(sleep(Duration::from_secs(150))).await;

        // t = 0, 60, 120
        assert_eq!(feed.cycles.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycles_never_overlap() {
        let feed = SlowFeed::new(Some(Duration::from_secs(90)));
        let scheduler = scheduler(feed.clone(), Duration::from_secs(60), Duration::from_secs(300));

        scheduler.run(sleep(Duration::from_secs(400))).await;

        assert_eq!(feed.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(feed.cycles.load(Ordering::SeqCst) >= 2);
        assert_eq!(feed.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_cycle_is_aborted_after_grace() {
        let feed = SlowFeed::new(None);
        let scheduler = scheduler(feed.clone(), Duration::from_secs(60), Duration::from_secs(5));

        let finished = timeout(
            Duration::from_secs(60),
            scheduler.run(sleep(Duration::from_secs(1))),
        )
        .await;

        assert!(finished.is_ok());
        assert_eq!(feed.cycles.load(Ordering::SeqCst), 1);
    }
}
