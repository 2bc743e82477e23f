//! Background `last_used_at` updates.
//!
//! The request path only enqueues a credential id; a single worker drains the
//! queue. When the queue is full the update is dropped.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::CredentialStore;

#[derive(Clone)]
pub struct LastUsedRecorder {
    tx: mpsc::Sender<Uuid>,
}

impl LastUsedRecorder {
    /// Start the worker. It stops once every recorder clone is dropped.
    pub fn spawn(store: Arc<dyn CredentialStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(store, rx));
        (Self { tx }, worker)
    }

    /// Enqueue an update without waiting.
    pub fn record(&self, api_key_id: Uuid) {
        match self.tx.try_send(api_key_id) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(api_key_id = %api_key_id, "last_used queue full, dropping update");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(api_key_id = %api_key_id, "last_used worker is gone, dropping update");
            }
        }
    }
}

async fn run_worker(store: Arc<dyn CredentialStore>, mut rx: mpsc::Receiver<Uuid>) {
    while let Some(api_key_id) = rx.recv().await {
        if let Err(e) = store.touch_last_used(api_key_id).await {
            warn!(api_key_id = %api_key_id, error = %e, "Failed to update api key last_used_at");
        }
    }
    debug!("last_used worker stopped");
}
