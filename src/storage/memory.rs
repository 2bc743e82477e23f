//! In-memory store for tests, with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, MatchStore, StoreError};
use crate::models::api_key::{ApiKey, NewApiKey};
use crate::models::{MatchRecord, Sport, StoredMatch, VolatileFields};

struct StoredRow {
    id: i64,
    record: MatchRecord,
    updates: u32,
}

#[derive(Default)]
pub struct MemoryStore {
    matches: Mutex<HashMap<(Sport, i64), StoredRow>>,
    next_id: AtomicI64,
    failing_match_ids: Mutex<HashSet<i64>>,
    credentials: Mutex<Vec<ApiKey>>,
    touched: Mutex<Vec<Uuid>>,
    fail_touch: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write for `match_id` fail.
    pub fn fail_writes_for(&self, match_id: i64) {
        self.failing_match_ids.lock().unwrap().insert(match_id);
    }

    pub fn fail_touches(&self) {
        self.fail_touch.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self, sport: Sport, match_id: i64) -> Option<MatchRecord> {
        self.matches
            .lock()
            .unwrap()
            .get(&(sport, match_id))
            .map(|row| row.record.clone())
    }

    pub fn update_count(&self, sport: Sport, match_id: i64) -> u32 {
        self.matches
            .lock()
            .unwrap()
            .get(&(sport, match_id))
            .map_or(0, |row| row.updates)
    }

    pub fn match_count(&self) -> usize {
        self.matches.lock().unwrap().len()
    }

    pub fn add_credential(&self, key: ApiKey) {
        self.credentials.lock().unwrap().push(key);
    }

    pub fn touched(&self) -> Vec<Uuid> {
        self.touched.lock().unwrap().clone()
    }

    fn check_writable(&self, match_id: i64) -> Result<(), StoreError> {
        if self.failing_match_ids.lock().unwrap().contains(&match_id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn apply_volatile(record: &mut MatchRecord, fields: &VolatileFields) -> Result<(), StoreError> {
    match (record, fields) {
        (MatchRecord::Soccer(record), VolatileFields::Soccer(fields)) => {
            record.status = fields.status.clone();
            record.home.goals = fields.home_goals;
            record.away.goals = fields.away_goals;
            record.ht_score = fields.ht_score.clone();
            record.ft_score = fields.ft_score.clone();
            record.events = fields.events.clone();
            Ok(())
        }
        (MatchRecord::Basketball(record), VolatileFields::Basketball(fields)) => {
            record.status = fields.status.clone();
            record.timer = fields.timer.clone();
            record.home.score = fields.home;
            record.away.score = fields.away;
            Ok(())
        }
        (record, _) => Err(StoreError::SportMismatch {
            expected: record.sport(),
        }),
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn find_match(
        &self,
        sport: Sport,
        match_id: i64,
    ) -> Result<Option<StoredMatch>, StoreError> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .get(&(sport, match_id))
            .map(|row| StoredMatch {
                id: row.id,
                match_id,
            }))
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.check_writable(record.match_id())?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.matches.lock().unwrap().insert(
            (record.sport(), record.match_id()),
            StoredRow {
                id,
                record: record.clone(),
                updates: 0,
            },
        );
        Ok(())
    }

    async fn update_volatile(
        &self,
        sport: Sport,
        match_id: i64,
        fields: &VolatileFields,
    ) -> Result<(), StoreError> {
        self.check_writable(match_id)?;
        let mut matches = self.matches.lock().unwrap();
        let row = matches
            .get_mut(&(sport, match_id))
            .ok_or(StoreError::MissingMatch { sport, match_id })?;
        apply_volatile(&mut row.record, fields)?;
        row.updates += 1;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_credential_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|key| key.key_hash == key_hash)
            .cloned())
    }

    async fn touch_last_used(&self, id: Uuid) -> Result<(), StoreError> {
        if self.fail_touch.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.touched.lock().unwrap().push(id);
        if let Some(key) = self
            .credentials
            .lock()
            .unwrap()
            .iter_mut()
            .find(|key| key.id == id)
        {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_credential(&self, new_key: NewApiKey) -> Result<ApiKey, StoreError> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            key_hash: new_key.key_hash,
            key_prefix: new_key.key_prefix,
            name: new_key.name,
            sports: new_key.sports,
            rate_limit: new_key.rate_limit,
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
            expires_at: new_key.expires_at,
        };
        self.credentials.lock().unwrap().push(key.clone());
        Ok(key)
    }

    async fn list_credentials(&self) -> Result<Vec<ApiKey>, StoreError> {
        let mut keys = self.credentials.lock().unwrap().clone();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn revoke_credential(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut credentials = self.credentials.lock().unwrap();
        match credentials.iter_mut().find(|key| key.id == id) {
            Some(key) => {
                key.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
