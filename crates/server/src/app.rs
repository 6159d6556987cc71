//! Router and shared state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use newsdesk_core::{FeedConfig, FetchConfig, Pipeline, PipelineConfig};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::routes::{feed_handler, fetch_article_handler, health_handler};

/// Slack on top of the upstream timeout before a request is abandoned.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub feed: Arc<FeedConfig>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let pipeline_config = PipelineConfig {
            min_length: config.min_article_length,
            fetch: FetchConfig { timeout: config.fetch_timeout_secs, ..Default::default() },
        };
        let pipeline = Pipeline::new(pipeline_config).context("Failed to build article pipeline")?;

        Ok(Self { pipeline: Arc::new(pipeline), feed: Arc::new(config.feed()) })
    }
}

/// Build the application router for `config`.
pub fn build_app(config: &Config) -> Result<Router> {
    let state = AppState::new(config)?;
    let request_timeout = Duration::from_secs(config.fetch_timeout_secs) + REQUEST_TIMEOUT_SLACK;

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/fetch-article", post(fetch_article_handler))
        .route("/api/feed", get(feed_handler))
        .with_state(state);

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
        router = router.fallback_service(ServeDir::new(dir));
    }

    Ok(router
        .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, request_timeout))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()))
}
