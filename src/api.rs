// src/api.rs
//! HTTP entry layer.
//!
//! The article url may come from the JSON body, the query string, or both;
//! the query string wins when both carry one.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::analysis::EnrichmentKind;
use crate::bus::Message;
use crate::error::PipelineError;
use crate::ingest;
use crate::model::Article;
use crate::pipeline::Pipeline;
use crate::report::report_failure;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/article",
            post(article_create).get(article_get).delete(article_delete),
        )
        .route("/news-sources", get(news_source_list))
        .route("/enrich/{kind}", post(enrich_push))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// JSON error body + status for a failed operation.
pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Publish(_) | PipelineError::Analysis(_) => StatusCode::BAD_GATEWAY,
        };
        let body = json!({
            "status": "error",
            "kind": self.0.kind(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Report a request rejected before it reached a pipeline component.
fn rejected(state: &AppState, operation: &'static str, error: PipelineError) -> ApiError {
    report_failure(state.pipeline.reporter(), operation, None, &error);
    ApiError(error)
}

fn success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}

#[derive(Debug, Default, Deserialize)]
struct UrlBody {
    #[serde(default)]
    url: Option<String>,
}

/// Merge body and query parameters into the request's url.
fn request_url(
    query: &HashMap<String, String>,
    body: &Bytes,
) -> Result<Option<String>, PipelineError> {
    if let Some(u) = query.get("url") {
        return Ok(Some(u.clone()));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: UrlBody = serde_json::from_slice(body)
        .map_err(|e| PipelineError::Validation(format!("invalid JSON body: {e}")))?;
    Ok(parsed.url)
}

async fn article_create(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let url = request_url(&query, &body).map_err(|e| rejected(&state, ingest::OPERATION, e))?;
    state.pipeline.ingest.submit_article(url.as_deref()).await?;
    Ok(success())
}

async fn article_get(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Article>, ApiError> {
    let url = request_url(&query, &body).map_err(|e| rejected(&state, "article_get", e))?;
    let article = state.pipeline.queries.get_article(url.as_deref()).await?;
    Ok(Json(article))
}

async fn article_delete(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let url = request_url(&query, &body).map_err(|e| rejected(&state, "article_delete", e))?;
    state.pipeline.queries.delete_article(url.as_deref()).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
    start_after: Option<String>,
}

async fn news_source_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let queries = &state.pipeline.queries;
    let out = match params.limit {
        Some(limit) => {
            let page = queries
                .list_news_sources_page(limit, params.start_after.as_deref())
                .await?;
            Json(page).into_response()
        }
        None => Json(queries.list_news_sources().await?).into_response(),
    };
    Ok(out)
}

/// Push delivery of one bus message to the worker for `kind`.
async fn enrich_push(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    message: Result<Json<Message>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let kind: EnrichmentKind = kind
        .parse()
        .map_err(|e: String| rejected(&state, "enrich", PipelineError::Validation(e)))?;
    let Json(message) = message.map_err(|e| {
        let error = PipelineError::Validation(format!("invalid message: {}", e.body_text()));
        rejected(&state, kind.operation(), error)
    })?;
    state.pipeline.workers.dispatch(kind, &message).await?;
    Ok(success())
}
