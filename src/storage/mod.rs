//! Storage seams used by the sync engine and the gateway.
//!
//! `MatchStore` is what reconciliation needs (lookup by natural key, insert,
//! volatile update) and `CredentialStore` is what the gateway and the key
//! provisioning commands need. `PgStore` implements both on PostgreSQL.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::api_key::{ApiKey, NewApiKey};
use crate::models::{MatchRecord, Sport, StoredMatch, VolatileFields};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An update targeted a match that is no longer stored.
    #[error("{sport} match {match_id} disappeared before it could be updated")]
    MissingMatch { sport: Sport, match_id: i64 },

    #[error("stored record does not belong to {expected}")]
    SportMismatch { expected: Sport },
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Look up a stored match by its upstream id.
    async fn find_match(&self, sport: Sport, match_id: i64)
    -> Result<Option<StoredMatch>, StoreError>;

    /// Insert a match with every field populated.
    async fn insert_match(&self, record: &MatchRecord) -> Result<(), StoreError>;

    /// Rewrite only the volatile fields of a stored match and bump its update time.
    async fn update_volatile(
        &self,
        sport: Sport,
        match_id: i64,
        fields: &VolatileFields,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a credential by key hash, revoked or not.
    async fn find_credential_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, StoreError>;

    async fn touch_last_used(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_credential(&self, new_key: NewApiKey) -> Result<ApiKey, StoreError>;

    /// All credentials, newest first.
    async fn list_credentials(&self) -> Result<Vec<ApiKey>, StoreError>;

    /// Mark a credential inactive. Returns `false` when no credential has that id.
    async fn revoke_credential(&self, id: Uuid) -> Result<bool, StoreError>;
}
