//! HTTP handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use newsdesk_core::{FeedEntry, NewsdeskError, PipelineOutcome, fetch_feed};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app::AppState;

const URL_MISSING: &str = "URL fehlt";
const FEED_UNREACHABLE: &str = "BILD News-Sitemap nicht erreichbar";
const FEED_ERROR: &str = "Feed-Fehler";
const PROCESSING_FAILED: &str = "Verarbeitung fehlgeschlagen";

#[derive(Debug, Default, Deserialize)]
pub struct FetchArticleRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub articles: Vec<FeedEntry>,
    pub count: usize,
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/fetch-article`
///
/// Answers with the article on success, the upstream status when the page
/// could not be loaded, and 422 when no article text was found. The page is
/// fetched on the runtime; pruning, extraction and cleaning run on the
/// blocking pool.
pub async fn fetch_article_handler(
    State(state): State<AppState>,
    Json(request): Json<FetchArticleRequest>,
) -> Response {
    let Some(url) = request.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, URL_MISSING);
    };

    let raw = match state.pipeline.fetch_document(url).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(url, error = %err, "article fetch failed");
            let outcome = PipelineOutcome::from_error(&err);
            let status = StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            return (status, Json(outcome.to_json())).into_response();
        }
    };

    let pipeline = Arc::clone(&state.pipeline);
    let outcome = match tokio::task::spawn_blocking(move || pipeline.process(&raw)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(url, error = %err, "article processing task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED);
        }
    };

    match &outcome {
        PipelineOutcome::Success(article) => tracing::info!(url, length = article.length, "article extracted"),
        PipelineOutcome::ExtractionFailure { message } => tracing::info!(url, reason = %message, "no article text"),
        PipelineOutcome::FetchFailure { .. } => {}
    }

    let status = StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(outcome.to_json())).into_response()
}

/// `GET /api/feed`
pub async fn feed_handler(State(state): State<AppState>) -> Response {
    let pipeline = &state.pipeline;
    match fetch_feed(pipeline.client(), &state.feed, &pipeline.config().fetch).await {
        Ok(articles) => {
            let count = articles.len();
            Json(FeedResponse { articles, count }).into_response()
        }
        Err(NewsdeskError::HttpStatus { status, .. }) => {
            tracing::warn!(status, url = %state.feed.url, "news sitemap unavailable");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, FEED_UNREACHABLE)
        }
        Err(err) => {
            tracing::error!(error = %err, "feed failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{FEED_ERROR}: {err}"))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
