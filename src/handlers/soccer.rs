//! Soccer read endpoints.
//!
//! - GET /api/v1/soccer/matches - Filtered, paginated matches
//! - GET /api/v1/soccer/matches/live - Matches currently in play
//! - GET /api/v1/soccer/matches/{match_id} - One match by upstream id
//! - GET /api/v1/soccer/leagues - Leagues with stored matches
//!
//! All routes sit behind the gateway with the `soccer` scope.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::matches::{
    MatchFilter, MatchListQuery, Page, SOCCER_TABLE, distinct_leagues, list_page, live_rows,
    row_by_match_id,
};
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        LeagueInfo, Sport,
        soccer::{SoccerMatch, SoccerMatchResponse},
    },
};

/// List soccer matches.
///
/// # Query Parameters
///
/// - `date` - kick-off day, `YYYY-MM-DD` (400 when malformed)
/// - `status` - exact upstream status, e.g. `FT`
/// - `league_id` - upstream league id
/// - `limit` - 1..=100, default 50
/// - `offset` - default 0
///
/// # Response
///
/// ```json
/// {
///   "data": [{ "match_id": 6012345, "status": "FT", "...": "..." }],
///   "meta": { "total": 312, "limit": 50, "offset": 0 }
/// }
/// ```
pub async fn list_matches(
    State(pool): State<DbPool>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Page<SoccerMatchResponse>>, AppError> {
    let filter = MatchFilter::from_query(query)?;
    let (rows, meta) = list_page::<SoccerMatch>(&pool, SOCCER_TABLE, &filter).await?;

    Ok(Json(Page {
        data: rows.into_iter().map(Into::into).collect(),
        meta,
    }))
}

/// Matches whose status is in the soccer live vocabulary (`1H`, `HT`, `2H`, ...).
pub async fn live_matches(
    State(pool): State<DbPool>,
) -> Result<Json<Vec<SoccerMatchResponse>>, AppError> {
    let rows =
        live_rows::<SoccerMatch>(&pool, SOCCER_TABLE, Sport::Soccer.live_statuses()).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Get one match by its upstream `match_id`; 404 when it was never synced.
pub async fn get_match(
    State(pool): State<DbPool>,
    Path(match_id): Path<i64>,
) -> Result<Json<SoccerMatchResponse>, AppError> {
    let row = row_by_match_id::<SoccerMatch>(&pool, SOCCER_TABLE, match_id).await?;
    Ok(Json(row.into()))
}

pub async fn list_leagues(State(pool): State<DbPool>) -> Result<Json<Vec<LeagueInfo>>, AppError> {
    Ok(Json(distinct_leagues(&pool, SOCCER_TABLE).await?))
}
