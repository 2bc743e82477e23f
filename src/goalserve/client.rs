//! HTTP client for the upstream feed.
//!
//! Requests go to `{base}/getfeed/{api_key}/{feed_path}/{selector}?json=1`.
//! The upstream throttles aggressively, so every request made through one
//! client waits for the previous one and for the configured spacing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;
use url::Url;

use super::{FeedError, FeedSource, FeedWindow};
use crate::models::Sport;

const BODY_PREVIEW_LIMIT: usize = 200;

/// Serializes requests and keeps at least `spacing` between their starts.
///
/// The lock is held for the whole request so at most one is outstanding.
struct Pacer {
    spacing: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_start: Mutex::new(None),
        }
    }

    async fn run<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            sleep_until(previous + self.spacing).await;
        }
        *last_start = Some(Instant::now());
        request.await
    }
}

pub struct GoalserveClient {
    http: Client,
    base_url: Url,
    api_key: String,
    pacer: Pacer,
}

impl GoalserveClient {
    /// Build a client with a per-request timeout and a minimum request spacing.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::InvalidConfig` when the base URL does not parse, the
    /// key is empty, or the reqwest client cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
        spacing: Duration,
    ) -> Result<Self, FeedError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FeedError::InvalidConfig("feed API key is empty".to_string()));
        }

        let mut base_url = Url::parse(base_url)
            .map_err(|e| FeedError::InvalidConfig(format!("invalid feed base URL: {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::InvalidConfig(e.without_url().to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            pacer: Pacer::new(spacing),
        })
    }

    fn feed_url(&self, sport: Sport, window: FeedWindow) -> Result<Url, FeedError> {
        let path = format!(
            "getfeed/{}/{}/{}",
            self.api_key,
            sport.feed_path(),
            window.selector()
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| FeedError::InvalidConfig(format!("cannot build feed URL: {e}")))?;
        url.query_pairs_mut().append_pair("json", "1");
        Ok(url)
    }

    async fn get_document(&self, url: Url) -> Result<Value, FeedError> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        extract_scores(&body)
    }
}

#[async_trait]
impl FeedSource for GoalserveClient {
    async fn fetch_scores(&self, sport: Sport, window: FeedWindow) -> Result<Value, FeedError> {
        let url = self.feed_url(sport, window)?;
        debug!(sport = %sport, window = %window, "Fetching feed document");

        let started = Instant::now();
        let result = self.pacer.run(self.get_document(url)).await;
        debug!(
            sport = %sport,
            window = %window,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Feed request finished"
        );
        result
    }
}

/// Parse a feed body and return the content of its `scores` member.
pub fn extract_scores(body: &[u8]) -> Result<Value, FeedError> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|e| FeedError::MalformedResponse(format!("invalid JSON payload: {e}")))?;

    match document {
        Value::Object(mut root) => match root.remove("scores") {
            Some(Value::Null) | None => Err(FeedError::MalformedResponse(
                "no scores field in feed document".to_string(),
            )),
            Some(scores) => Ok(scores),
        },
        _ => Err(FeedError::MalformedResponse(
            "feed document is not a JSON object".to_string(),
        )),
    }
}

// The request URL embeds the feed key, so it is stripped from transport errors.
fn transport_error(error: reqwest::Error) -> FeedError {
    FeedError::Network(error.without_url())
}

fn status_error(status: StatusCode, body: &[u8]) -> FeedError {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(BODY_PREVIEW_LIMIT).collect();
    if compact.chars().count() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }

    FeedError::Status {
        status: status.as_u16(),
        body: preview,
    }
}
