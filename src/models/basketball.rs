//! Basketball match models.
//!
//! Same shape as soccer: a normalized record, a `basketball_matches` row and an
//! API response. Basketball carries per-quarter and overtime scores plus a timer.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::LeagueInfo;

/// Running and per-period score of one team. Every value is optional because the
/// feed leaves periods blank until they are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuarterLine {
    pub total: Option<i32>,
    pub q1: Option<i32>,
    pub q2: Option<i32>,
    pub q3: Option<i32>,
    pub q4: Option<i32>,
    pub ot: Option<i32>,
}

/// One side of a basketball fixture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasketballTeamLine {
    pub id: i64,
    pub name: String,
    pub score: QuarterLine,
}

/// Normalized basketball match.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketballMatchRecord {
    pub match_id: i64,
    pub league: LeagueInfo,
    pub file_group: Option<String>,
    pub status: String,
    pub match_date: NaiveDate,
    pub match_time: NaiveTime,
    pub timer: Option<String>,
    pub home: BasketballTeamLine,
    pub away: BasketballTeamLine,
}

/// Fields rewritten when an already stored basketball match is observed again.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketballVolatile {
    pub status: String,
    pub timer: Option<String>,
    pub home: QuarterLine,
    pub away: QuarterLine,
}

impl BasketballMatchRecord {
    pub fn volatile(&self) -> BasketballVolatile {
        BasketballVolatile {
            status: self.status.clone(),
            timer: self.timer.clone(),
            home: self.home.score,
            away: self.away.score,
        }
    }
}

/// Represents a basketball match record from the database (`basketball_matches`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BasketballMatch {
    pub id: i64,
    pub match_id: i64,
    pub league_gid: i64,
    pub league_id: i64,
    pub league_name: String,
    pub file_group: Option<String>,
    pub match_status: String,
    pub match_date: NaiveDate,
    pub match_time: NaiveTime,
    pub timer: Option<String>,
    pub h_team_id: i64,
    pub h_team_name: String,
    pub h_team_score: Option<i32>,
    pub h_team_q1: Option<i32>,
    pub h_team_q2: Option<i32>,
    pub h_team_q3: Option<i32>,
    pub h_team_q4: Option<i32>,
    pub h_team_ot: Option<i32>,
    pub a_team_id: i64,
    pub a_team_name: String,
    pub a_team_score: Option<i32>,
    pub a_team_q1: Option<i32>,
    pub a_team_q2: Option<i32>,
    pub a_team_q3: Option<i32>,
    pub a_team_q4: Option<i32>,
    pub a_team_ot: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Home/away pair for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScorePair {
    pub home: i32,
    pub away: i32,
}

impl ScorePair {
    /// A pair exists only once both sides have a value.
    fn from_sides(home: Option<i32>, away: Option<i32>) -> Option<Self> {
        Some(Self {
            home: home?,
            away: away?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct QuarterScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1: Option<ScorePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q2: Option<ScorePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q3: Option<ScorePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q4: Option<ScorePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ot: Option<ScorePair>,
}

#[derive(Debug, Serialize)]
pub struct BasketballTeamInfo {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

/// Response body for basketball match endpoints.
#[derive(Debug, Serialize)]
pub struct BasketballMatchResponse {
    pub id: i64,
    pub match_id: i64,
    pub sport: &'static str,
    pub league_id: i64,
    pub league_gid: i64,
    pub league_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_group: Option<String>,
    pub status: String,
    pub match_date: NaiveDate,
    pub match_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,
    pub home_team: BasketballTeamInfo,
    pub away_team: BasketballTeamInfo,
    pub quarters: QuarterScores,
    pub updated_at: DateTime<Utc>,
}

impl From<BasketballMatch> for BasketballMatchResponse {
    fn from(row: BasketballMatch) -> Self {
        let quarters = QuarterScores {
            q1: ScorePair::from_sides(row.h_team_q1, row.a_team_q1),
            q2: ScorePair::from_sides(row.h_team_q2, row.a_team_q2),
            q3: ScorePair::from_sides(row.h_team_q3, row.a_team_q3),
            q4: ScorePair::from_sides(row.h_team_q4, row.a_team_q4),
            ot: ScorePair::from_sides(row.h_team_ot, row.a_team_ot),
        };

        Self {
            id: row.id,
            match_id: row.match_id,
            sport: "basketball",
            league_id: row.league_id,
            league_gid: row.league_gid,
            league_name: row.league_name,
            file_group: row.file_group,
            status: row.match_status,
            match_date: row.match_date,
            match_time: row.match_time,
            timer: row.timer,
            home_team: BasketballTeamInfo {
                id: row.h_team_id,
                name: row.h_team_name,
                score: row.h_team_score,
            },
            away_team: BasketballTeamInfo {
                id: row.a_team_id,
                name: row.a_team_name,
                score: row.a_team_score,
            },
            quarters,
            updated_at: row.updated_at,
        }
    }
}
