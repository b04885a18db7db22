use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracker_analytics::{ChartSeries, ReportGenerator};
use tracker_core::journal::ReflectionEntry;
use tracker_core::tracker::Progress;
use tracker_core::{DailyAggregate, SessionInput, TrackerError};

type ApiError = (StatusCode, String);

/// Map a tracker error onto an HTTP status with its message as the body.
fn api_error(e: TrackerError) -> ApiError {
    let status = match &e {
        TrackerError::InvalidInput(_)
        | TrackerError::EmptyReflection
        | TrackerError::EmptyInsightBatch => StatusCode::BAD_REQUEST,
        TrackerError::GoalNotReached { .. } => StatusCode::FORBIDDEN,
        TrackerError::EmptyLedger => StatusCode::NOT_FOUND,
        TrackerError::ExternalCallFailure(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Malformed or mistyped bodies are input errors like any other.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| api_error(TrackerError::InvalidInput(rejection.body_text())))
}

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Sessions ────────────────────────────────────────────────────────────

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/v1/sessions", get(list_sessions).post(create_session))
}

async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let tracker = state.tracker.read().await;
    Json(tracker.sessions().to_vec())
}

async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<SessionInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = json_body(body)?;
    let mut tracker = state.tracker.write().await;
    let record = tracker.append_session(input).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

// ── Summary & progress ──────────────────────────────────────────────────

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/summary", get(summary))
        .route("/v1/progress", get(progress))
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    aggregate: DailyAggregate,
    progress: Progress,
}

async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tracker = state.tracker.read().await;
    let aggregate = tracker.aggregate().map_err(api_error)?;
    let progress = tracker.progress().map_err(api_error)?;
    Ok(Json(SummaryResponse {
        aggregate,
        progress,
    }))
}

async fn progress(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tracker = state.tracker.read().await;
    let progress = tracker.progress().map_err(api_error)?;
    Ok(Json(progress))
}

// ── Reflections ─────────────────────────────────────────────────────────

pub fn reflection_routes() -> Router<AppState> {
    Router::new().route(
        "/v1/reflections",
        get(list_reflections).post(create_reflection),
    )
}

#[derive(Debug, Deserialize)]
struct ReflectionRequest {
    text: String,
}

async fn list_reflections(State(state): State<AppState>) -> Json<Vec<ReflectionEntry>> {
    let tracker = state.tracker.read().await;
    Json(tracker.list_reflections())
}

async fn create_reflection(
    State(state): State<AppState>,
    body: Result<Json<ReflectionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(body)?;
    let mut tracker = state.tracker.write().await;
    let entry = tracker.append_reflection(&req.text).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// ── Insights ────────────────────────────────────────────────────────────

pub fn insight_routes() -> Router<AppState> {
    Router::new().route("/v1/insights", get(list_insights).post(submit_insights))
}

#[derive(Debug, Deserialize)]
struct InsightRequest {
    lines: Vec<String>,
}

async fn list_insights(State(state): State<AppState>) -> Json<Vec<String>> {
    let tracker = state.tracker.read().await;
    Json(tracker.list_insights())
}

async fn submit_insights(
    State(state): State<AppState>,
    body: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(body)?;
    // Log the lines, then release the tracker before calling out.
    let batch = {
        let mut tracker = state.tracker.write().await;
        tracker.record_insights(req.lines.as_slice()).map_err(api_error)?
    };

    let result = state.summarizer.summarize(&batch).await;
    Ok(Json(result))
}

// ── Analytics ───────────────────────────────────────────────────────────

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/charts", get(charts))
        .route("/v1/report", get(report))
}

async fn charts(State(state): State<AppState>) -> Json<ChartSeries> {
    let tracker = state.tracker.read().await;
    Json(ChartSeries::from_records(tracker.sessions()))
}

async fn report(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tracker = state.tracker.read().await;
    let markdown = ReportGenerator::daily_report(&tracker).map_err(api_error)?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}
