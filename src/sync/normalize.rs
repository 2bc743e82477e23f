//! Turn a feed `scores` document into typed match records.
//!
//! Malformed categories are skipped, malformed matches are rejected one by one,
//! and nothing here touches storage.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::RecordError;
use super::schedule::{parse_basketball_schedule, parse_soccer_schedule};
use crate::goalserve::FeedError;
use crate::goalserve::basketball::{BasketballCategoryDto, BasketballMatchDto, BasketballTeamDto};
use crate::goalserve::shape::into_list;
use crate::goalserve::soccer::{SoccerCategoryDto, SoccerEventDto, SoccerMatchDto, SoccerTeamDto};
use crate::models::basketball::{BasketballMatchRecord, BasketballTeamLine, QuarterLine};
use crate::models::soccer::{SoccerEvent, SoccerMatchRecord, SoccerTeamLine};
use crate::models::{LeagueInfo, MatchRecord, Sport};

/// A match dropped during normalization.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Raw upstream id, which may itself be the problem.
    pub match_id: String,
    pub error: RecordError,
}

#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<MatchRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub skipped_categories: usize,
}

impl NormalizedBatch {
    fn push(&mut self, raw_id: &str, result: Result<MatchRecord, RecordError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(error) => {
                debug!(match_id = raw_id, error = %error, "Rejecting feed match");
                self.rejected.push(RejectedRecord {
                    match_id: raw_id.to_string(),
                    error,
                });
            }
        }
    }
}

/// Normalize the content of a document's `scores` member.
///
/// # Errors
///
/// `FeedError::MalformedResponse` when `scores` is not an object. Problems
/// inside individual categories or matches never fail the document.
pub fn normalize_scores(
    sport: Sport,
    scores: Value,
    today: NaiveDate,
) -> Result<NormalizedBatch, FeedError> {
    let Value::Object(mut scores) = scores else {
        return Err(FeedError::MalformedResponse(
            "scores member is not an object".to_string(),
        ));
    };

    let mut batch = NormalizedBatch::default();
    for (index, raw) in into_list(scores.remove("category")).into_iter().enumerate() {
        match sport {
            Sport::Soccer => {
                if let Some(category) = decode_category::<SoccerCategoryDto>(sport, index, raw) {
                    normalize_soccer_category(category, today, &mut batch);
                } else {
                    batch.skipped_categories += 1;
                }
            }
            Sport::Basketball => {
                if let Some(category) = decode_category::<BasketballCategoryDto>(sport, index, raw)
                {
                    normalize_basketball_category(category, &mut batch);
                } else {
                    batch.skipped_categories += 1;
                }
            }
        }
    }

    Ok(batch)
}

fn decode_category<T: DeserializeOwned>(sport: Sport, index: usize, raw: Value) -> Option<T> {
    match serde_json::from_value(raw) {
        Ok(category) => Some(category),
        Err(e) => {
            warn!(sport = %sport, index, error = %e, "Skipping malformed feed category");
            None
        }
    }
}

fn league_of(id: &str, gid: &str, name: &str) -> LeagueInfo {
    LeagueInfo {
        id: parse_id(id),
        gid: parse_id(gid),
        name: name.trim().to_string(),
    }
}

fn normalize_soccer_category(category: SoccerCategoryDto, today: NaiveDate, batch: &mut NormalizedBatch) {
    let league = league_of(&category.id, &category.gid, &category.name);
    for raw in category.matches.items {
        let raw_id = raw_match_id(&raw, "@id");
        let result = decode_match::<SoccerMatchDto>(raw)
            .and_then(|dto| normalize_soccer_match(&league, dto, today))
            .map(MatchRecord::Soccer);
        batch.push(&raw_id, result);
    }
}

fn normalize_basketball_category(category: BasketballCategoryDto, batch: &mut NormalizedBatch) {
    let league = league_of(&category.id, &category.gid, &category.name);
    let file_group = non_empty(&category.file_group);
    for raw in category.matches {
        let raw_id = raw_match_id(&raw, "id");
        let result = decode_match::<BasketballMatchDto>(raw)
            .and_then(|dto| normalize_basketball_match(&league, file_group.clone(), dto))
            .map(MatchRecord::Basketball);
        batch.push(&raw_id, result);
    }
}

fn decode_match<T: DeserializeOwned>(raw: Value) -> Result<T, RecordError> {
    serde_json::from_value(raw).map_err(|e| RecordError::MalformedMatch(e.to_string()))
}

/// Best-effort id of a match that may not decode, for logs and rejections.
fn raw_match_id(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

pub fn normalize_soccer_match(
    league: &LeagueInfo,
    dto: SoccerMatchDto,
    today: NaiveDate,
) -> Result<SoccerMatchRecord, RecordError> {
    let match_id = parse_match_id(&dto.id)?;
    let schedule = parse_soccer_schedule(&dto.formatted_date, &dto.date, &dto.time, today)?;

    Ok(SoccerMatchRecord {
        match_id,
        league: league.clone(),
        status: dto.status.trim().to_string(),
        start_date: schedule.date,
        start_time: schedule.time,
        home: soccer_team(&dto.localteam),
        away: soccer_team(&dto.visitorteam),
        ht_score: non_empty(&dto.ht.score),
        ft_score: non_empty(&dto.ft.score),
        events: normalize_events(dto.events),
    })
}

pub fn normalize_basketball_match(
    league: &LeagueInfo,
    file_group: Option<String>,
    dto: BasketballMatchDto,
) -> Result<BasketballMatchRecord, RecordError> {
    let match_id = parse_match_id(&dto.id)?;
    let schedule = parse_basketball_schedule(&dto.date, &dto.time)?;

    Ok(BasketballMatchRecord {
        match_id,
        league: league.clone(),
        file_group,
        status: dto.status.trim().to_string(),
        match_date: schedule.date,
        match_time: schedule.time,
        timer: non_empty(&dto.timer),
        home: basketball_team(&dto.localteam),
        away: basketball_team(&dto.awayteam),
    })
}

fn soccer_team(dto: &SoccerTeamDto) -> SoccerTeamLine {
    SoccerTeamLine {
        id: parse_id(&dto.id),
        name: dto.name.trim().to_string(),
        goals: parse_score(&dto.goals),
    }
}

fn basketball_team(dto: &BasketballTeamDto) -> BasketballTeamLine {
    BasketballTeamLine {
        id: parse_id(&dto.id),
        name: dto.name.trim().to_string(),
        score: QuarterLine {
            total: parse_score(&dto.totalscore),
            q1: parse_score(&dto.q1),
            q2: parse_score(&dto.q2),
            q3: parse_score(&dto.q3),
            q4: parse_score(&dto.q4),
            ot: parse_score(&dto.ot),
        },
    }
}

/// Events arrive as null, `{"event": one-or-many}`, a bare event or an array.
/// Anything that does not decode yields no events rather than a rejection.
pub fn normalize_events(raw: Option<Value>) -> Vec<SoccerEvent> {
    let items = match raw {
        Some(Value::Object(mut object)) => match object.remove("event") {
            Some(inner) => into_list(Some(inner)),
            None if object.is_empty() => Vec::new(),
            None => vec![Value::Object(object)],
        },
        other => into_list(other),
    };

    let decoded: Result<Vec<SoccerEventDto>, _> =
        items.into_iter().map(serde_json::from_value).collect();

    match decoded {
        Ok(events) => events
            .into_iter()
            .map(|event| SoccerEvent {
                kind: event.kind,
                team: event.team,
                player: event.player,
                minute: event.minute,
            })
            .collect(),
        Err(e) => {
            debug!(error = %e, "Discarding undecodable match events");
            Vec::new()
        }
    }
}

/// The natural key must be a positive integer.
fn parse_match_id(raw: &str) -> Result<i64, RecordError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RecordError::InvalidMatchId(raw.to_string())),
    }
}

/// Team and league ids are display fields; unparsable ones become 0.
fn parse_id(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Empty or unparsable scores mean "not yet available", never 0.
fn parse_score(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
