//! `serve`: the read API behind the tenant gateway.
//!
//! # Routes
//!
//! - `GET /health` - public
//! - `GET /api/v1/{sport}/matches`, `/matches/live`, `/matches/{match_id}`,
//!   `/leagues` - require an API key scoped to `{sport}`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::shutdown_signal;
use crate::config::Config;
use crate::db::DbPool;
use crate::handlers;
use crate::middleware::auth::{Gateway, SportGate, auth_middleware};
use crate::middleware::last_used::LastUsedRecorder;
use crate::models::Sport;
use crate::storage::PgStore;

pub async fn run(config: &Config, pool: DbPool, store: Arc<PgStore>, port: u16) -> anyhow::Result<()> {
    let (recorder, last_used_worker) =
        LastUsedRecorder::spawn(store.clone(), config.last_used_queue_capacity);
    let gateway = Arc::new(Gateway::new(store, recorder));
    let cors = cors_layer(config.allowed_origins())?;
    let app = build_router(pool, gateway, cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!(grace_secs = config.shutdown_grace_secs, "Draining HTTP connections");
    drain(stop_tx, server, last_used_worker, config.shutdown_grace()).await?;

    info!("Server stopped");
    Ok(())
}

/// Stop accepting, then give open connections and the last-used worker one
/// shared `grace` window.
async fn drain(
    stop_tx: oneshot::Sender<()>,
    mut server: JoinHandle<std::io::Result<()>>,
    last_used_worker: JoinHandle<()>,
    grace: Duration,
) -> anyhow::Result<()> {
    let deadline = Instant::now() + grace;
    let _ = stop_tx.send(());

    match timeout_at(deadline, &mut server).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!("Connections still open after the grace window, aborting");
            server.abort();
        }
    }

    // The router owned the last recorder handle; the worker drains and exits.
    if timeout_at(deadline, last_used_worker).await.is_err() {
        warn!("last_used worker did not finish within the grace window");
    }

    Ok(())
}

/// Assemble the application router.
pub fn build_router(pool: DbPool, gateway: Arc<Gateway>, cors: CorsLayer) -> Router {
    let mut app = Router::new().route("/health", get(handlers::health::health_check));

    for sport in Sport::ALL {
        app = app.nest(
            &format!("/api/v1/{sport}"),
            sport_routes(sport, gateway.clone()),
        );
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

fn sport_routes(sport: Sport, gateway: Arc<Gateway>) -> Router<DbPool> {
    let routes = match sport {
        Sport::Soccer => Router::new()
            .route("/matches", get(handlers::soccer::list_matches))
            .route("/matches/live", get(handlers::soccer::live_matches))
            .route("/matches/{match_id}", get(handlers::soccer::get_match))
            .route("/leagues", get(handlers::soccer::list_leagues)),
        Sport::Basketball => Router::new()
            .route("/matches", get(handlers::basketball::list_matches))
            .route("/matches/live", get(handlers::basketball::live_matches))
            .route("/matches/{match_id}", get(handlers::basketball::get_match))
            .route("/leagues", get(handlers::basketball::list_leagues)),
    };

    // route_layer: unmatched paths stay 404 instead of 401
    routes.route_layer(axum_middleware::from_fn_with_state(
        SportGate::new(gateway, sport),
        auth_middleware,
    ))
}

/// Read-only CORS policy; `None` allows any origin.
pub fn cors_layer(origins: Option<Vec<String>>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ]);

    let Some(origins) = origins else {
        return Ok(layer.allow_origin(Any));
    };

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api_key::ApiKey;
    use crate::services::api_key_service::hash_api_key;
    use crate::storage::memory::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SOCCER_KEY: &str = "sk_live_soccer0000000000";

    // The pool never connects: every request here is answered before a handler
    // touches the database.
    fn app(origins: Option<Vec<String>>) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        store.add_credential(ApiKey {
            id: Uuid::new_v4(),
            key_hash: hash_api_key(SOCCER_KEY),
            key_prefix: SOCCER_KEY[..12].to_string(),
            name: "Soccer only".to_string(),
            sports: vec!["soccer".to_string()],
            rate_limit: 60,
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
            expires_at: None,
        });
        let (recorder, _worker) = LastUsedRecorder::spawn(store.clone(), 8);
        let gateway = Arc::new(Gateway::new(store, recorder));

        build_router(pool, gateway, cors_layer(origins).unwrap())
    }

    fn get_request(uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn every_sport_route_requires_a_key() {
        for uri in [
            "/api/v1/soccer/matches",
            "/api/v1/soccer/matches/live",
            "/api/v1/soccer/matches/42",
            "/api/v1/basketball/leagues",
        ] {
            let response = app(None).oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn sport_gate_matches_the_mounted_sport() {
        let response = app(None)
            .oneshot(get_request("/api/v1/basketball/matches", Some(SOCCER_KEY)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found_without_a_key() {
        let response = app(None)
            .oneshot(get_request("/api/v1/cricket/matches", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preflight_is_answered_without_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/soccer/matches")
            .header(header::ORIGIN, "https://a.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app(Some(vec!["https://a.example".to_string()]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://a.example"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn server_and_worker_share_one_grace_window() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let _ = stop_rx.await;
            tokio::time::sleep(Duration::from_secs(100)).await;
            Ok(())
        });
        let worker = tokio::spawn(tokio::time::sleep(Duration::from_secs(100)));

        let started = Instant::now();
        drain(stop_tx, server, worker, Duration::from_secs(10))
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(11), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_shutdown_does_not_wait_for_the_deadline() {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let _ = stop_rx.await;
            Ok(())
        });
        let worker = tokio::spawn(async {});

        let started = Instant::now();
        drain(stop_tx, server, worker, Duration::from_secs(10))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn invalid_origin_is_a_startup_error() {
        assert!(cors_layer(Some(vec!["bad\norigin".to_string()])).is_err());
    }
}
