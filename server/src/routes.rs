use crate::error::ApiError;
use crate::payload::TranscriptForm;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use meetmap_core::model::RunBundle;
use query::{AskRequest, ChatAnswer, ContextPreview};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use storage::TranscriptMeta;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the HTTP surface. Every route is served both at the root and
/// under `/api`.
pub fn create_router(state: Arc<AppState>, cors_allowed_origins: &[String]) -> Router {
    let routes = api_routes();
    let router = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allowed_origins.is_empty() {
        router
    } else {
        router.layer(build_cors_layer(cors_allowed_origins))
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .route("/upload", post(process))
        .route("/transcripts", post(store_transcript))
        .route("/latest", get(latest))
        .route("/runs", get(runs))
        .route("/by_date/:date", get(by_date))
        .route("/friendli_chat", post(friendli_chat))
        .route("/friendli_context_preview", get(friendli_context_preview))
}

fn build_cors_layer(cors_allowed_origins: &[String]) -> CorsLayer {
    let mut parsed = Vec::new();
    for origin in cors_allowed_origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
        .allow_origin(parsed)
}

#[derive(Debug, Deserialize)]
struct RunParams {
    run: Option<String>,
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn process(
    State(state): State<Arc<AppState>>,
    TranscriptForm(upload): TranscriptForm,
) -> Result<Json<RunBundle>, ApiError> {
    state
        .pipeline
        .process(upload)
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn store_transcript(
    State(state): State<Arc<AppState>>,
    TranscriptForm(upload): TranscriptForm,
) -> Result<Json<TranscriptMeta>, ApiError> {
    state
        .pipeline
        .store_transcript(upload)
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn latest(State(state): State<Arc<AppState>>) -> Result<Json<RunBundle>, ApiError> {
    state
        .bundles
        .latest()
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn runs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    state
        .bundles
        .runs()
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<RunBundle>, ApiError> {
    state
        .bundles
        .by_date(&date)
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn friendli_chat(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunParams>,
    Json(request): Json<AskRequest>,
) -> Result<Json<ChatAnswer>, ApiError> {
    state
        .chat
        .ask(request.messages, params.run.as_deref())
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}

async fn friendli_context_preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunParams>,
) -> Result<Json<ContextPreview>, ApiError> {
    state
        .chat
        .preview(params.run.as_deref())
        .await
        .map(Json)
        .map_err(ApiError::from_error)
}
