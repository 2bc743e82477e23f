//! Insert-or-update of a single normalized record.

use tracing::debug;

use super::RecordError;
use crate::models::MatchRecord;
use crate::storage::MatchStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted,
    Updated,
}

/// Write `record` to the store.
///
/// An unknown `match_id` is inserted with every field; a known one only gets
/// its volatile fields rewritten, so league, teams and kick-off stay as first
/// observed.
pub async fn reconcile(
    store: &dyn MatchStore,
    record: &MatchRecord,
) -> Result<ReconcileOutcome, RecordError> {
    let sport = record.sport();
    let match_id = record.match_id();

    match store.find_match(sport, match_id).await? {
        None => {
            store.insert_match(record).await?;
            debug!(sport = %sport, match_id, fixture = %record.fixture_label(), "Inserted match");
            Ok(ReconcileOutcome::Inserted)
        }
        Some(existing) => {
            store
                .update_volatile(sport, match_id, &record.volatile_fields())
                .await?;
            debug!(sport = %sport, match_id, id = existing.id, "Updated match");
            Ok(ReconcileOutcome::Updated)
        }
    }
}
