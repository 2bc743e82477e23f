//! Feed reconciliation engine.
//!
//! A cycle for one sport fetches today's document and the following week,
//! normalizes every match and writes it through a `MatchStore`:
//!
//! - `schedule`: layered date/time parsing
//! - `normalize`: feed documents into `MatchRecord`s
//! - `reconcile`: insert-or-update of one record
//! - `service`: one full cycle and its outcome
//! - `scheduler`: per-sport periodic loops with bounded shutdown

use std::fmt;

use crate::goalserve::{FeedError, FeedWindow};
use crate::models::Sport;
use crate::storage::StoreError;

pub mod normalize;
pub mod reconcile;
pub mod schedule;
pub mod scheduler;
pub mod service;

pub use scheduler::Scheduler;
pub use service::SyncService;

/// Failure of a single record. Never aborts the batch it belongs to.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("undecodable match: {0}")]
    MalformedMatch(String),

    #[error("invalid match id '{0}'")]
    InvalidMatchId(String),

    #[error("unparsable schedule (date '{date}', time '{time}')")]
    InvalidSchedule { date: String, time: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Failure of a whole cycle. Only today's window is allowed to cause one.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("today's {sport} feed could not be fetched: {source}")]
    TodayUnavailable {
        sport: Sport,
        #[source]
        source: FeedError,
    },
}

/// A record that could not be persisted.
#[derive(Debug)]
pub struct RecordFailure {
    pub window: FeedWindow,
    pub match_id: i64,
    pub error: RecordError,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match {} ({}): {}", self.match_id, self.window, self.error)
    }
}

/// Aggregate result of one cycle.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub inserted: usize,
    pub updated: usize,
    /// Records dropped by normalization (bad id or schedule).
    pub rejected: usize,
    /// Windows other than today that could not be fetched or decoded.
    pub skipped_windows: usize,
    /// Categories whose shape could not be decoded.
    pub skipped_categories: usize,
    pub failures: Vec<RecordFailure>,
}

impl SyncOutcome {
    pub fn succeeded(&self) -> usize {
        self.inserted + self.updated
    }
}
