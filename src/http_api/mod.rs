use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::{
    Exercise, ExerciseFilter, ExercisePatch, NewExercise, NewProgressEntry, NewScheduleEntry,
    ProgressEntry, ProgressSummary, ScheduleEntry, ScheduleEntryPatch, Tracker, TrackerError,
    persistence::write_progress_csv,
    quote::{Quote, QuoteSource},
    summary::HistoryPoint,
    tracker::SharedTracker,
};

#[derive(Clone)]
pub struct AppState {
    tracker: SharedTracker,
    quotes: Arc<QuoteSource>,
}

impl AppState {
    pub fn new(tracker: Tracker, quotes: QuoteSource) -> Self {
        Self::with_shared(Arc::new(RwLock::new(tracker)), quotes)
    }

    pub fn with_shared(tracker: SharedTracker, quotes: QuoteSource) -> Self {
        Self {
            tracker,
            quotes: Arc::new(quotes),
        }
    }

}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl From<TrackerError> for ApiError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::Validation(err) => ApiError::Invalid(err.to_string()),
            err @ TrackerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            TrackerError::Persistence(err) => {
                error!(%err, "store failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

/// `Json` whose rejections are reported as `invalid_request`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct ApiJson<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct ApiPath<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct ApiQuery<T>(T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ExerciseQuery {
    category: Option<String>,
    difficulty: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/exercises/:id",
            get(get_exercise).put(update_exercise).delete(delete_exercise),
        )
        .route("/schedule", get(list_schedule).post(create_schedule_entry))
        .route(
            "/schedule/:id",
            put(update_schedule_entry).delete(delete_schedule_entry),
        )
        .route("/progress", get(list_progress).post(record_progress))
        .route("/progress/summary", get(progress_summary))
        .route("/progress/history", get(progress_history))
        .route("/progress/export", get(export_progress))
        .route("/progress/:id", delete(delete_progress))
        .route("/quote", get(quote))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

fn deleted() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

async fn welcome() -> &'static str {
    "Welcome to Physio Tracker"
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_exercises(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExerciseQuery>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let filter = ExerciseFilter::parse(query.category.as_deref(), query.difficulty.as_deref())
        .map_err(|err| ApiError::Invalid(err.to_string()))?;
    let exercises = state.tracker.read().exercises_matching(&filter);
    Ok(Json(exercises))
}

async fn get_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Exercise>, ApiError> {
    let found = state.tracker.read().find_exercise(id).cloned();
    found
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("exercise {id} not found")))
}

async fn create_exercise(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewExercise>,
) -> Result<(StatusCode, Json<Exercise>), ApiError> {
    let created = state.tracker.write().create_exercise(new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ExercisePatch>,
) -> Result<Json<Exercise>, ApiError> {
    let updated = state.tracker.write().update_exercise(id, &patch)?;
    Ok(Json(updated))
}

async fn delete_exercise(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tracker.write().delete_exercise(id)?;
    Ok(deleted())
}

async fn list_schedule(State(state): State<AppState>) -> Json<Vec<ScheduleEntry>> {
    Json(state.tracker.read().schedule_entries().to_vec())
}

async fn create_schedule_entry(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewScheduleEntry>,
) -> Result<(StatusCode, Json<ScheduleEntry>), ApiError> {
    let created = state.tracker.write().create_schedule_entry(new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_schedule_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ScheduleEntryPatch>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let updated = state.tracker.write().update_schedule_entry(id, &patch)?;
    Ok(Json(updated))
}

async fn delete_schedule_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tracker.write().delete_schedule_entry(id)?;
    Ok(deleted())
}

async fn list_progress(State(state): State<AppState>) -> Json<Vec<ProgressEntry>> {
    Json(state.tracker.read().progress().to_vec())
}

async fn record_progress(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewProgressEntry>,
) -> Result<(StatusCode, Json<ProgressEntry>), ApiError> {
    let created = state.tracker.write().record_progress(new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_progress(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tracker.write().delete_progress(id)?;
    Ok(deleted())
}

async fn progress_summary(State(state): State<AppState>) -> Json<ProgressSummary> {
    Json(state.tracker.read().summary())
}

async fn progress_history(State(state): State<AppState>) -> Json<Vec<HistoryPoint>> {
    Json(state.tracker.read().history())
}

async fn export_progress(State(state): State<AppState>) -> Result<Response, ApiError> {
    let entries = state.tracker.read().progress().to_vec();
    let mut body = Vec::new();
    write_progress_csv(&entries, &mut body).map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], body).into_response())
}

async fn quote(State(state): State<AppState>) -> Json<Quote> {
    Json(state.quotes.quote_or_fallback().await)
}
