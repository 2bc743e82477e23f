//! Upstream sports feed: wire formats and the paced HTTP client.
//!
//! - `client`: `GoalserveClient`, the reqwest-backed `FeedSource`
//! - `shape`: serde helpers for one-or-many lists and loosely typed scalars
//! - `soccer` / `basketball`: per-sport wire DTOs

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::models::Sport;

pub mod basketball;
pub mod client;
pub mod shape;
pub mod soccer;

pub use client::GoalserveClient;

/// Furthest day offset the feed serves in either direction.
pub const MAX_DAY_OFFSET: u8 = 7;

/// Errors raised while fetching a feed document.
///
/// None of the variants carry the request URL: it embeds the feed credential.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("feed returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed feed response: {0}")]
    MalformedResponse(String),

    #[error("invalid feed configuration: {0}")]
    InvalidConfig(String),
}

/// Which day of the feed to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedWindow {
    Today,
    /// `n` days back, 1..=7
    PastDay(u8),
    /// `n` days ahead, 1..=7
    FutureDay(u8),
}

impl FeedWindow {
    /// The seven days following today, nearest first.
    pub fn upcoming_week() -> Vec<Self> {
        (1..=MAX_DAY_OFFSET).map(FeedWindow::FutureDay).collect()
    }

    /// The seven days before today, nearest first.
    pub fn past_week() -> Vec<Self> {
        (1..=MAX_DAY_OFFSET).map(FeedWindow::PastDay).collect()
    }

    /// Path selector understood by the upstream: `home`, `d-N` or `dN`.
    pub fn selector(self) -> String {
        match self {
            FeedWindow::Today => "home".to_string(),
            FeedWindow::PastDay(days) => format!("d-{days}"),
            FeedWindow::FutureDay(days) => format!("d{days}"),
        }
    }
}

impl fmt::Display for FeedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedWindow::Today => f.write_str("today"),
            FeedWindow::PastDay(days) => write!(f, "today-{days}"),
            FeedWindow::FutureDay(days) => write!(f, "today+{days}"),
        }
    }
}

/// Source of raw feed documents.
///
/// `fetch_scores` returns the content of the document's `scores` object; the
/// sport-specific decoding is left to the normalizer.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_scores(&self, sport: Sport, window: FeedWindow) -> Result<Value, FeedError>;

    /// Fetch several windows one after another. Failed windows are logged and
    /// left out of the result; the rest are still returned.
    async fn fetch_windows(&self, sport: Sport, windows: &[FeedWindow]) -> Vec<(FeedWindow, Value)> {
        let mut documents = Vec::with_capacity(windows.len());

        for &window in windows {
            match self.fetch_scores(sport, window).await {
                Ok(scores) => documents.push((window, scores)),
                Err(e) => warn!(
                    sport = %sport,
                    window = %window,
                    error = %e,
                    "Skipping feed window after fetch failure"
                ),
            }
        }

        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn selectors_follow_upstream_naming() {
        assert_eq!(FeedWindow::Today.selector(), "home");
        assert_eq!(FeedWindow::PastDay(1).selector(), "d-1");
        assert_eq!(FeedWindow::FutureDay(7).selector(), "d7");
    }

    #[test]
    fn week_windows_cover_one_to_seven_days_nearest_first() {
        let past = FeedWindow::past_week();
        assert_eq!(past.first(), Some(&FeedWindow::PastDay(1)));
        assert_eq!(past.last(), Some(&FeedWindow::PastDay(7)));
        assert_eq!(past.len(), 7);

        let upcoming = FeedWindow::upcoming_week();
        assert_eq!(upcoming.first(), Some(&FeedWindow::FutureDay(1)));
        assert_eq!(upcoming.len(), 7);
    }

    struct FlakySource {
        failing: FeedWindow,
        requested: Mutex<Vec<FeedWindow>>,
    }

    #[async_trait]
    impl FeedSource for FlakySource {
        async fn fetch_scores(&self, _sport: Sport, window: FeedWindow) -> Result<Value, FeedError> {
            self.requested.lock().unwrap().push(window);
            if window == self.failing {
                return Err(FeedError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(serde_json::json!({ "category": [] }))
        }
    }

    #[tokio::test]
    async fn failed_window_is_skipped_and_later_windows_still_fetched() {
        let source = FlakySource {
            failing: FeedWindow::FutureDay(3),
            requested: Mutex::new(Vec::new()),
        };

        let windows = FeedWindow::upcoming_week();
        let documents = source.fetch_windows(Sport::Soccer, &windows).await;

        assert_eq!(documents.len(), 6);
        assert!(documents.iter().all(|(window, _)| *window != FeedWindow::FutureDay(3)));
        assert_eq!(*source.requested.lock().unwrap(), windows);
    }
}
