//! One reconciliation cycle for one sport.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::normalize::{NormalizedBatch, normalize_scores};
use super::reconcile::{ReconcileOutcome, reconcile};
use super::{RecordFailure, SyncError, SyncOutcome};
use crate::goalserve::{FeedSource, FeedWindow};
use crate::models::Sport;
use crate::storage::MatchStore;

pub struct SyncService {
    sport: Sport,
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn MatchStore>,
}

impl SyncService {
    pub fn new(sport: Sport, feed: Arc<dyn FeedSource>, store: Arc<dyn MatchStore>) -> Self {
        Self { sport, feed, store }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    /// Run a full cycle: today, then each of the next seven days.
    ///
    /// # Errors
    ///
    /// Only when today's document cannot be fetched or decoded. Per-record and
    /// per-day problems are reported in the returned `SyncOutcome`.
    pub async fn run_cycle(&self) -> Result<SyncOutcome, SyncError> {
        self.run_cycle_on(Utc::now().date_naive()).await
    }

    pub(crate) async fn run_cycle_on(&self, today: NaiveDate) -> Result<SyncOutcome, SyncError> {
        let sport = self.sport;
        let mut outcome = SyncOutcome::default();

        let batch = self
            .feed
            .fetch_scores(sport, FeedWindow::Today)
            .await
            .and_then(|scores| normalize_scores(sport, scores, today))
            .map_err(|source| SyncError::TodayUnavailable { sport, source })?;
        self.apply(FeedWindow::Today, batch, &mut outcome).await;

        self.apply_windows(&FeedWindow::upcoming_week(), today, &mut outcome)
            .await;
        self.log_summary("cycle", &outcome);

        Ok(outcome)
    }

    /// Re-read the past seven days, picking up results finalized after a match
    /// left the upcoming window. No day is mandatory here.
    pub async fn run_backfill(&self) -> SyncOutcome {
        self.run_backfill_on(Utc::now().date_naive()).await
    }

    pub(crate) async fn run_backfill_on(&self, today: NaiveDate) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        self.apply_windows(&FeedWindow::past_week(), today, &mut outcome)
            .await;
        self.log_summary("backfill", &outcome);
        outcome
    }

    async fn apply_windows(&self, windows: &[FeedWindow], today: NaiveDate, outcome: &mut SyncOutcome) {
        let documents = self.feed.fetch_windows(self.sport, windows).await;
        outcome.skipped_windows += windows.len() - documents.len();

        for (window, scores) in documents {
            self.apply_document(window, scores, today, outcome).await;
        }
    }

    fn log_summary(&self, pass: &'static str, outcome: &SyncOutcome) {
        info!(
            sport = %self.sport,
            pass,
            inserted = outcome.inserted,
            updated = outcome.updated,
            rejected = outcome.rejected,
            failed = outcome.failures.len(),
            skipped_windows = outcome.skipped_windows,
            skipped_categories = outcome.skipped_categories,
            "Sync pass completed"
        );

        if !outcome.failures.is_empty() {
            let failures: Vec<String> = outcome.failures.iter().map(ToString::to_string).collect();
            warn!(
                sport = %self.sport,
                pass,
                failures = %failures.join("; "),
                "Some matches could not be stored"
            );
        }
    }

    async fn apply_document(
        &self,
        window: FeedWindow,
        scores: Value,
        today: NaiveDate,
        outcome: &mut SyncOutcome,
    ) {
        match normalize_scores(self.sport, scores, today) {
            Ok(batch) => self.apply(window, batch, outcome).await,
            Err(e) => {
                warn!(sport = %self.sport, window = %window, error = %e, "Skipping undecodable feed window");
                outcome.skipped_windows += 1;
            }
        }
    }

    async fn apply(&self, window: FeedWindow, batch: NormalizedBatch, outcome: &mut SyncOutcome) {
        outcome.rejected += batch.rejected.len();
        outcome.skipped_categories += batch.skipped_categories;
        for rejected in &batch.rejected {
            warn!(
                sport = %self.sport,
                window = %window,
                match_id = %rejected.match_id,
                error = %rejected.error,
                "Feed match rejected during normalization"
            );
        }

        for record in &batch.records {
            match reconcile(self.store.as_ref(), record).await {
                Ok(ReconcileOutcome::Inserted) => outcome.inserted += 1,
                Ok(ReconcileOutcome::Updated) => outcome.updated += 1,
                Err(error) => {
                    outcome.failures.push(RecordFailure {
                        window,
                        match_id: record.match_id(),
                        error,
                    });
                }
            }
        }
    }
}
