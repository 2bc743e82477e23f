//! Basketball read endpoints, same layout as soccer under `/api/v1/basketball`.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::matches::{
    BASKETBALL_TABLE, MatchFilter, MatchListQuery, Page, distinct_leagues, list_page, live_rows,
    row_by_match_id,
};
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        LeagueInfo, Sport,
        basketball::{BasketballMatch, BasketballMatchResponse},
    },
};

pub async fn list_matches(
    State(pool): State<DbPool>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Page<BasketballMatchResponse>>, AppError> {
    let filter = MatchFilter::from_query(query)?;
    let (rows, meta) = list_page::<BasketballMatch>(&pool, BASKETBALL_TABLE, &filter).await?;

    Ok(Json(Page {
        data: rows.into_iter().map(Into::into).collect(),
        meta,
    }))
}

/// Quarters, overtime, half-time and the upstream "Live"/"In Play" markers.
pub async fn live_matches(
    State(pool): State<DbPool>,
) -> Result<Json<Vec<BasketballMatchResponse>>, AppError> {
    let rows = live_rows::<BasketballMatch>(
        &pool,
        BASKETBALL_TABLE,
        Sport::Basketball.live_statuses(),
    )
    .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn get_match(
    State(pool): State<DbPool>,
    Path(match_id): Path<i64>,
) -> Result<Json<BasketballMatchResponse>, AppError> {
    let row = row_by_match_id::<BasketballMatch>(&pool, BASKETBALL_TABLE, match_id).await?;
    Ok(Json(row.into()))
}

pub async fn list_leagues(State(pool): State<DbPool>) -> Result<Json<Vec<LeagueInfo>>, AppError> {
    Ok(Json(distinct_leagues(&pool, BASKETBALL_TABLE).await?))
}
