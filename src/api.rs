//! HTTP API over the analysis pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Input | Output |
//! |--------|------|-------|--------|
//! | GET | `/analyze` | `?url=` query parameter | [`AnalysisResult`] |
//! | POST | `/analyze` | JSON body `{"url": "..."}` | [`AnalysisResult`] |
//! | GET | `/health` | - | `{"status": "ok", "model": "<state>"}` |
//!
//! A missing or blank URL is answered with `400 {"detail": "missing_url"}`;
//! an article that cannot be fetched with `502 {"detail": "fetch_failed"}`.

use crate::models::AnalysisResult;
use crate::pipeline::Pipeline;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Query string or JSON body carrying the article URL.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Client-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    MissingUrl,
    FetchFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::MissingUrl => (StatusCode::BAD_REQUEST, "missing_url"),
            ApiError::FetchFailed => (StatusCode::BAD_GATEWAY, "fetch_failed"),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the API router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/analyze", get(analyze_get).post(analyze_post))
        .route("/health", get(health))
        .with_state(pipeline)
}

/// Preload the model, bind `host:port` and serve until the process exits.
#[instrument(level = "info", skip(pipeline))]
pub async fn serve(pipeline: Arc<Pipeline>, host: &str, port: u16) -> Result<(), Box<dyn Error>> {
    let model_ready = pipeline.preload().await;
    info!(model_ready, "Classifier initialized");

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

async fn analyze_get(
    State(pipeline): State<Arc<Pipeline>>,
    Query(request): Query<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    analyze(&pipeline, request).await
}

async fn analyze_post(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    analyze(&pipeline, request).await
}

#[instrument(level = "info", skip_all, fields(url = ?request.url))]
async fn analyze(
    pipeline: &Pipeline,
    request: AnalyzeRequest,
) -> Result<Json<AnalysisResult>, ApiError> {
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    let t0 = Instant::now();
    match pipeline.analyze_url(url).await {
        Some(result) => {
            info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Analysis served");
            Ok(Json(result))
        }
        None => {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, "Fetch failed");
            Err(ApiError::FetchFailed)
        }
    }
}

async fn health(State(pipeline): State<Arc<Pipeline>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model": pipeline.classifier.state().as_str(),
    }))
}
