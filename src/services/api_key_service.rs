//! API key provisioning.
//!
//! Keys look like `sk_live_` followed by 64 hex characters. Only the SHA-256
//! hash and a short display prefix are stored; the plaintext is returned once
//! to the caller of `create_api_key` and then forgotten.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Sport;
use crate::models::api_key::{ALL_SPORTS_SCOPE, ApiKey, NewApiKey};
use crate::storage::{CredentialStore, StoreError};

pub const KEY_PREFIX: &str = "sk_live_";

/// Characters of the key kept for display (`sk_live_` plus four).
const DISPLAY_PREFIX_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ApiKeyError {
    #[error("unknown sport scope '{0}' (expected soccer, basketball or *)")]
    UnknownScope(String),

    #[error("at least one sport scope is required")]
    NoScopes,

    #[error("rate limit must be at least 1 request per minute, got {0}")]
    InvalidRateLimit(i32),

    #[error("api key name must not be empty")]
    EmptyName,

    #[error("no api key with id {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly generated key. `plaintext` must be shown to the user and dropped.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub plaintext: String,
    pub hash: String,
    pub prefix: String,
}

/// Input of `create_api_key`.
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub name: String,
    pub sports: String,
    pub rate_limit: i32,
    pub expires_in_days: Option<u32>,
}

pub fn generate_api_key() -> GeneratedKey {
    let bytes: [u8; 32] = rand::random();
    let plaintext = format!("{KEY_PREFIX}{}", hex::encode(bytes));
    let hash = hash_api_key(&plaintext);
    let prefix = plaintext[..DISPLAY_PREFIX_LEN].to_string();

    GeneratedKey {
        plaintext,
        hash,
        prefix,
    }
}

/// Lowercase hex SHA-256 of the full key.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a comma separated scope list such as `soccer,basketball` or `*`.
pub fn parse_sport_scopes(raw: &str) -> Result<Vec<String>, ApiKeyError> {
    let mut scopes: Vec<String> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let scope = if entry == ALL_SPORTS_SCOPE {
            ALL_SPORTS_SCOPE.to_string()
        } else {
            entry
                .parse::<Sport>()
                .map_err(|_| ApiKeyError::UnknownScope(entry.to_string()))?
                .as_str()
                .to_string()
        };
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    if scopes.is_empty() {
        return Err(ApiKeyError::NoScopes);
    }
    Ok(scopes)
}

/// Validate the request, generate a key and store its hash.
///
/// Returns the stored record and the plaintext key.
pub async fn create_api_key(
    store: &dyn CredentialStore,
    request: CreateApiKey,
) -> Result<(ApiKey, String), ApiKeyError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiKeyError::EmptyName);
    }
    if request.rate_limit < 1 {
        return Err(ApiKeyError::InvalidRateLimit(request.rate_limit));
    }
    let sports = parse_sport_scopes(&request.sports)?;

    let generated = generate_api_key();
    let expires_at = request
        .expires_in_days
        .map(|days| Utc::now() + Duration::days(i64::from(days)));

    let stored = store
        .create_credential(NewApiKey {
            key_hash: generated.hash,
            key_prefix: generated.prefix,
            name: name.to_string(),
            sports,
            rate_limit: request.rate_limit,
            expires_at,
        })
        .await?;

    Ok((stored, generated.plaintext))
}

pub async fn revoke_api_key(store: &dyn CredentialStore, id: Uuid) -> Result<(), ApiKeyError> {
    if store.revoke_credential(id).await? {
        Ok(())
    } else {
        Err(ApiKeyError::NotFound(id))
    }
}
