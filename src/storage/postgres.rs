//! PostgreSQL implementation of the storage traits.
//!
//! Every write is a single statement, so a failed record never leaves a
//! partially written row behind.

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::{CredentialStore, MatchStore, StoreError};
use crate::db::DbPool;
use crate::models::api_key::{ApiKey, NewApiKey};
use crate::models::basketball::{BasketballMatchRecord, BasketballVolatile};
use crate::models::soccer::{SoccerMatchRecord, SoccerVolatile};
use crate::models::{MatchRecord, Sport, StoredMatch, VolatileFields};

const API_KEY_COLUMNS: &str = "id, key_hash, key_prefix, name, sports, rate_limit, is_active, \
                               created_at, last_used_at, expires_at";

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_soccer(&self, record: &SoccerMatchRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO soccer_matches (
                match_id, league_gid, league_id, league_name, match_status,
                match_start_date, match_start_time,
                h_team_id, a_team_id, h_team_name, a_team_name,
                h_team_goals, a_team_goals, ht_score, ft_score, events
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(record.match_id)
        .bind(record.league.gid)
        .bind(record.league.id)
        .bind(&record.league.name)
        .bind(&record.status)
        .bind(record.start_date)
        .bind(record.start_time)
        .bind(record.home.id)
        .bind(record.away.id)
        .bind(&record.home.name)
        .bind(&record.away.name)
        .bind(record.home.goals)
        .bind(record.away.goals)
        .bind(&record.ht_score)
        .bind(&record.ft_score)
        .bind(Json(&record.events))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_basketball(&self, record: &BasketballMatchRecord) -> Result<(), StoreError> {
        let home = &record.home;
        let away = &record.away;

        sqlx::query(
            r#"
            INSERT INTO basketball_matches (
                match_id, league_gid, league_id, league_name, file_group, match_status,
                match_date, match_time, timer,
                h_team_id, h_team_name, h_team_score,
                h_team_q1, h_team_q2, h_team_q3, h_team_q4, h_team_ot,
                a_team_id, a_team_name, a_team_score,
                a_team_q1, a_team_q2, a_team_q3, a_team_q4, a_team_ot
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(record.match_id)
        .bind(record.league.gid)
        .bind(record.league.id)
        .bind(&record.league.name)
        .bind(&record.file_group)
        .bind(&record.status)
        .bind(record.match_date)
        .bind(record.match_time)
        .bind(&record.timer)
        .bind(home.id)
        .bind(&home.name)
        .bind(home.score.total)
        .bind(home.score.q1)
        .bind(home.score.q2)
        .bind(home.score.q3)
        .bind(home.score.q4)
        .bind(home.score.ot)
        .bind(away.id)
        .bind(&away.name)
        .bind(away.score.total)
        .bind(away.score.q1)
        .bind(away.score.q2)
        .bind(away.score.q3)
        .bind(away.score.q4)
        .bind(away.score.ot)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_soccer(&self, match_id: i64, fields: &SoccerVolatile) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE soccer_matches
            SET match_status = $1,
                h_team_goals = $2,
                a_team_goals = $3,
                ht_score = $4,
                ft_score = $5,
                events = $6,
                updated_at = NOW()
            WHERE match_id = $7
            "#,
        )
        .bind(&fields.status)
        .bind(fields.home_goals)
        .bind(fields.away_goals)
        .bind(&fields.ht_score)
        .bind(&fields.ft_score)
        .bind(Json(&fields.events))
        .bind(match_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_basketball(
        &self,
        match_id: i64,
        fields: &BasketballVolatile,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE basketball_matches
            SET match_status = $1,
                timer = $2,
                h_team_score = $3,
                h_team_q1 = $4,
                h_team_q2 = $5,
                h_team_q3 = $6,
                h_team_q4 = $7,
                h_team_ot = $8,
                a_team_score = $9,
                a_team_q1 = $10,
                a_team_q2 = $11,
                a_team_q3 = $12,
                a_team_q4 = $13,
                a_team_ot = $14,
                updated_at = NOW()
            WHERE match_id = $15
            "#,
        )
        .bind(&fields.status)
        .bind(&fields.timer)
        .bind(fields.home.total)
        .bind(fields.home.q1)
        .bind(fields.home.q2)
        .bind(fields.home.q3)
        .bind(fields.home.q4)
        .bind(fields.home.ot)
        .bind(fields.away.total)
        .bind(fields.away.q1)
        .bind(fields.away.q2)
        .bind(fields.away.q3)
        .bind(fields.away.q4)
        .bind(fields.away.ot)
        .bind(match_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn match_table(sport: Sport) -> &'static str {
    match sport {
        Sport::Soccer => "soccer_matches",
        Sport::Basketball => "basketball_matches",
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn find_match(
        &self,
        sport: Sport,
        match_id: i64,
    ) -> Result<Option<StoredMatch>, StoreError> {
        let sql = format!(
            "SELECT id, match_id FROM {} WHERE match_id = $1",
            match_table(sport)
        );
        let row: Option<(i64, i64)> = sqlx::query_as(&sql)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, match_id)| StoredMatch { id, match_id }))
    }

    async fn insert_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        match record {
            MatchRecord::Soccer(record) => self.insert_soccer(record).await,
            MatchRecord::Basketball(record) => self.insert_basketball(record).await,
        }
    }

    async fn update_volatile(
        &self,
        sport: Sport,
        match_id: i64,
        fields: &VolatileFields,
    ) -> Result<(), StoreError> {
        let rows = match (sport, fields) {
            (Sport::Soccer, VolatileFields::Soccer(fields)) => {
                self.update_soccer(match_id, fields).await?
            }
            (Sport::Basketball, VolatileFields::Basketball(fields)) => {
                self.update_basketball(match_id, fields).await?
            }
            (expected, _) => return Err(StoreError::SportMismatch { expected }),
        };

        if rows == 0 {
            return Err(StoreError::MissingMatch { sport, match_id });
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_credential_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, StoreError> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key_hash = $1");
        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(key)
    }

    async fn touch_last_used(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_credential(&self, new_key: NewApiKey) -> Result<ApiKey, StoreError> {
        let sql = format!(
            "INSERT INTO api_keys (key_hash, key_prefix, name, sports, rate_limit, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {API_KEY_COLUMNS}"
        );
        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(&new_key.key_hash)
            .bind(&new_key.key_prefix)
            .bind(&new_key.name)
            .bind(&new_key.sports)
            .bind(new_key.rate_limit)
            .bind(new_key.expires_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(key)
    }

    async fn list_credentials(&self) -> Result<Vec<ApiKey>, StoreError> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC");
        let keys = sqlx::query_as::<_, ApiKey>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    async fn revoke_credential(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
