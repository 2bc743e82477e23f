//! Soccer match models.
//!
//! This module defines:
//! - `SoccerMatchRecord`: a normalized upstream match (what the reconciliation engine writes)
//! - `SoccerMatch`: a row of the `soccer_matches` table
//! - `SoccerMatchResponse`: the read API representation

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::LeagueInfo;

/// One side of a soccer fixture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoccerTeamLine {
    pub id: i64,
    pub name: String,
    /// `None` until the feed reports a score ("not yet available" is not 0).
    pub goals: Option<i32>,
}

/// A match event (goal, card, substitution) as stored in the `events` JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoccerEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub team: String,
    pub player: String,
    #[serde(rename = "time")]
    pub minute: String,
}

/// Normalized soccer match.
///
/// `start_date` is the calendar day of kick-off and `start_time` the time of
/// day; they map to separate DATE and TIME columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SoccerMatchRecord {
    pub match_id: i64,
    pub league: LeagueInfo,
    pub status: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub home: SoccerTeamLine,
    pub away: SoccerTeamLine,
    pub ht_score: Option<String>,
    pub ft_score: Option<String>,
    pub events: Vec<SoccerEvent>,
}

/// Fields rewritten when an already stored soccer match is observed again.
#[derive(Debug, Clone, PartialEq)]
pub struct SoccerVolatile {
    pub status: String,
    pub home_goals: Option<i32>,
    pub away_goals: Option<i32>,
    pub ht_score: Option<String>,
    pub ft_score: Option<String>,
    pub events: Vec<SoccerEvent>,
}

impl SoccerMatchRecord {
    pub fn volatile(&self) -> SoccerVolatile {
        SoccerVolatile {
            status: self.status.clone(),
            home_goals: self.home.goals,
            away_goals: self.away.goals,
            ht_score: self.ht_score.clone(),
            ft_score: self.ft_score.clone(),
            events: self.events.clone(),
        }
    }
}

/// Represents a soccer match record from the database.
///
/// # Database Table
///
/// Maps to the `soccer_matches` table. `id` is the storage key; `match_id` is the
/// upstream natural key and is unique.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SoccerMatch {
    pub id: i64,
    pub match_id: i64,
    pub league_gid: i64,
    pub league_id: i64,
    pub league_name: String,
    pub match_status: String,
    pub match_start_date: NaiveDate,
    pub match_start_time: NaiveTime,
    pub h_team_id: i64,
    pub a_team_id: i64,
    pub h_team_name: String,
    pub a_team_name: String,
    pub h_team_goals: Option<i32>,
    pub a_team_goals: Option<i32>,
    pub ht_score: Option<String>,
    pub ft_score: Option<String>,
    pub events: Json<Vec<SoccerEvent>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team as shown in API responses.
#[derive(Debug, Serialize)]
pub struct TeamInfo {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

/// Response body for soccer match endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "match_id": 6012345,
///   "sport": "soccer",
///   "league_id": 1204,
///   "league_gid": 1204,
///   "league_name": "England: Premier League",
///   "status": "HT",
///   "start_date": "2026-01-29",
///   "start_time": "20:00:00",
///   "home_team": { "id": 9249, "name": "Arsenal", "score": 1 },
///   "away_team": { "id": 9260, "name": "Chelsea", "score": 0 },
///   "half_time_score": "[1-0]",
///   "events": [{ "type": "goal", "team": "localteam", "player": "Saka", "time": "23" }]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct SoccerMatchResponse {
    pub id: i64,
    pub match_id: i64,
    pub sport: &'static str,
    pub league_id: i64,
    pub league_gid: i64,
    pub league_name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_time_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_time_score: Option<String>,
    pub events: Vec<SoccerEvent>,
    pub updated_at: DateTime<Utc>,
}

impl From<SoccerMatch> for SoccerMatchResponse {
    fn from(row: SoccerMatch) -> Self {
        Self {
            id: row.id,
            match_id: row.match_id,
            sport: "soccer",
            league_id: row.league_id,
            league_gid: row.league_gid,
            league_name: row.league_name,
            status: row.match_status,
            start_date: row.match_start_date,
            start_time: row.match_start_time,
            home_team: TeamInfo {
                id: row.h_team_id,
                name: row.h_team_name,
                score: row.h_team_goals,
            },
            away_team: TeamInfo {
                id: row.a_team_id,
                name: row.a_team_name,
                score: row.a_team_goals,
            },
            half_time_score: row.ht_score,
            full_time_score: row.ft_score,
            events: row.events.0,
            updated_at: row.updated_at,
        }
    }
}
