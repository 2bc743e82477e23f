//! Health check endpoint for service monitoring.

use crate::{db::DbPool, error::AppError};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
///
/// Besides database connectivity it reports when each sport's table was last
/// written, which tells whether the sync process is keeping up.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub last_sync: LastSync,
    pub timestamp: DateTime<Utc>,
}

/// Most recent `updated_at` per sport, `null` while a table is empty.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LastSync {
    pub soccer: Option<DateTime<Utc>>,
    pub basketball: Option<DateTime<Utc>>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "last_sync": { "soccer": "2026-01-29T20:41:00Z", "basketball": null },
///   "timestamp": "2026-01-29T20:41:12Z"
/// }
/// ```
///
/// If the database is unreachable the standard 500 error response is returned.
pub async fn health_check(State(pool): State<DbPool>) -> Result<Json<HealthResponse>, AppError> {
    let last_sync = sqlx::query_as::<_, LastSync>(
        r#"
        SELECT
            (SELECT MAX(updated_at) FROM soccer_matches) AS soccer,
            (SELECT MAX(updated_at) FROM basketball_matches) AS basketball
        "#,
    )
    .fetch_one(&pool)
    .await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        database: "connected",
        last_sync,
        timestamp: Utc::now(),
    }))
}
