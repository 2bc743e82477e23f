//! API Key model for authentication.
//!
//! API keys authenticate tenants of the read API. They are stored as SHA-256
//! hashes; the plaintext exists only in the output of `apikey create`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Sport;

/// Scope entry that authorizes every sport.
pub const ALL_SPORTS_SCOPE: &str = "*";

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table. Keys are never deleted: revocation clears
/// `is_active` and the row stays for auditing.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    /// SHA-256 hash of the full key (64 hex characters), unique.
    ///
    /// When a request comes in with "Bearer sk_live_...", we hash the token and
    /// look this column up. The plaintext is never compared or stored.
    pub key_hash: String,

    /// First characters of the key, safe to display and list.
    pub key_prefix: String,

    /// Human-readable label
    pub name: String,

    /// Authorized sport scopes (`*` authorizes all).
    pub sports: Vec<String>,

    /// Requests per minute budget.
    pub rate_limit: i32,

    /// Inactive keys are rejected during authentication.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    /// Updated in the background after each authenticated request.
    pub last_used_at: Option<DateTime<Utc>>,

    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Whether this key may query `sport`.
    pub fn allows_sport(&self, sport: Sport) -> bool {
        self.sports
            .iter()
            .any(|scope| scope == ALL_SPORTS_SCOPE || scope == sport.as_str())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Values needed to store a freshly generated key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub sports: Vec<String>,
    pub rate_limit: i32,
    pub expires_at: Option<DateTime<Utc>>,
}
