//! Query parameters and SQL shared by the per-sport match endpoints.
//!
//! Both sports store matches in tables with the same key columns; only the
//! table name and the schedule column names differ.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::{db::DbPool, error::AppError, models::LeagueInfo};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// Where one sport keeps its matches.
#[derive(Debug, Clone, Copy)]
pub struct MatchTable {
    pub name: &'static str,
    pub date_column: &'static str,
    pub time_column: &'static str,
}

pub const SOCCER_TABLE: MatchTable = MatchTable {
    name: "soccer_matches",
    date_column: "match_start_date",
    time_column: "match_start_time",
};

pub const BASKETBALL_TABLE: MatchTable = MatchTable {
    name: "basketball_matches",
    date_column: "match_date",
    time_column: "match_time",
};

/// Raw query string of `GET /matches`.
///
/// Kept as strings so a bad `limit` falls back to the default instead of
/// failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct MatchListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub league_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub league_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl MatchFilter {
    /// # Errors
    ///
    /// `AppError::InvalidRequest` when `date` is present but not `YYYY-MM-DD`.
    pub fn from_query(query: MatchListQuery) -> Result<Self, AppError> {
        let date = match non_blank(query.date) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                AppError::InvalidRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
            })?),
            None => None,
        };

        let limit = non_blank(query.limit)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|limit| (1..=MAX_LIMIT).contains(limit))
            .unwrap_or(DEFAULT_LIMIT);

        let offset = non_blank(query.offset)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0);

        Ok(Self {
            date,
            status: non_blank(query.status),
            league_id: non_blank(query.league_id).and_then(|raw| raw.parse().ok()),
            limit,
            offset,
        })
    }

    /// Append `AND ...` conditions; the builder must already end in a WHERE clause.
    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>, table: MatchTable) {
        if let Some(date) = self.date {
            builder
                .push(" AND ")
                .push(table.date_column)
                .push(" = ")
                .push_bind(date);
        }
        if let Some(status) = &self.status {
            builder.push(" AND match_status = ").push_bind(status.clone());
        }
        if let Some(league_id) = self.league_id {
            builder.push(" AND league_id = ").push_bind(league_id);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Paginated list response.
///
/// ```json
/// { "data": [...], "meta": { "total": 120, "limit": 50, "offset": 0 } }
/// ```
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Filtered, paginated rows ordered by kick-off, newest first.
pub async fn list_page<R>(
    pool: &DbPool,
    table: MatchTable,
    filter: &MatchFilter,
) -> Result<(Vec<R>, PageMeta), AppError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count = QueryBuilder::<Postgres>::new(format!(
        "SELECT COUNT(*) FROM {} WHERE TRUE",
        table.name
    ));
    filter.push_conditions(&mut count, table);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {} WHERE TRUE", table.name));
    filter.push_conditions(&mut select, table);
    select
        .push(format!(
            " ORDER BY {} DESC, {} DESC LIMIT ",
            table.date_column, table.time_column
        ))
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);
    let rows = select.build_query_as::<R>().fetch_all(pool).await?;

    Ok((
        rows,
        PageMeta {
            total,
            limit: filter.limit,
            offset: filter.offset,
        },
    ))
}

/// Rows whose status is one of `live_statuses`, earliest kick-off first.
pub async fn live_rows<R>(
    pool: &DbPool,
    table: MatchTable,
    live_statuses: &[&str],
) -> Result<Vec<R>, AppError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let statuses: Vec<String> = live_statuses.iter().map(|s| s.to_string()).collect();
    let sql = format!(
        "SELECT * FROM {} WHERE match_status = ANY($1) ORDER BY {} ASC, {} ASC",
        table.name, table.date_column, table.time_column
    );

    let rows = sqlx::query_as::<_, R>(&sql)
        .bind(statuses)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn row_by_match_id<R>(pool: &DbPool, table: MatchTable, match_id: i64) -> Result<R, AppError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE match_id = $1", table.name);

    sqlx::query_as::<_, R>(&sql)
        .bind(match_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::MatchNotFound)
}

/// Distinct leagues seen in a sport's table, by name.
pub async fn distinct_leagues(pool: &DbPool, table: MatchTable) -> Result<Vec<LeagueInfo>, AppError> {
    let sql = format!(
        "SELECT DISTINCT league_id AS id, league_gid AS gid, league_name AS name \
         FROM {} WHERE league_id <> 0 ORDER BY name ASC",
        table.name
    );

    let leagues = sqlx::query_as::<_, LeagueInfo>(&sql).fetch_all(pool).await?;
    Ok(leagues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> MatchListQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/matches?{encoded}").parse().unwrap();
        axum::extract::Query::<MatchListQuery>::try_from_uri(&uri)
            .unwrap()
            .0
    }

    #[test]
    fn defaults_apply_without_parameters() {
        let filter = MatchFilter::from_query(MatchListQuery::default()).unwrap();
        assert_eq!(filter.limit, DEFAULT_LIMIT);
        assert_eq!(filter.offset, 0);
        assert!(filter.date.is_none());
    }

    #[test]
    fn out_of_range_paging_falls_back_to_defaults() {
        for limit in ["0", "101", "-3", "lots"] {
            let filter = MatchFilter::from_query(query(&[("limit", limit), ("offset", "-1")])).unwrap();
            assert_eq!(filter.limit, DEFAULT_LIMIT);
            assert_eq!(filter.offset, 0);
        }

        let filter = MatchFilter::from_query(query(&[("limit", "100"), ("offset", "20")])).unwrap();
        assert_eq!((filter.limit, filter.offset), (100, 20));
    }

    #[test]
    fn malformed_date_is_a_bad_request() {
        let err = MatchFilter::from_query(query(&[("date", "29.01.2026")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let filter = MatchFilter::from_query(query(&[("date", "2026-01-29")])).unwrap();
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2026, 1, 29));
    }

    #[test]
    fn conditions_use_the_sport_date_column() {
        let filter = MatchFilter::from_query(query(&[
            ("date", "2026-01-29"),
            ("status", "FT"),
            ("league_id", "1204"),
        ]))
        .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM basketball_matches WHERE TRUE");
        filter.push_conditions(&mut builder, BASKETBALL_TABLE);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM basketball_matches WHERE TRUE AND match_date = $1 \
             AND match_status = $2 AND league_id = $3"
        );
    }
}
