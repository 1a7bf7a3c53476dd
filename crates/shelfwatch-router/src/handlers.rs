//! HTTP request handlers for the router.
//!
//! Exposes the alert pass trigger, an aging summary and a health check.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use shelfwatch_domain::traits::{ItemQuery, ItemStore};
use shelfwatch_domain::{AgingBucket, AlertEvent};
use shelfwatch_store::{SqliteStore, StoreError};
use shelfwatch_sweeper::{unix_now, AlertSweeper, PassReport, SweeperError};
use std::sync::{Arc, Mutex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Store serving items, notifications and recipients
    pub store: Arc<Mutex<SqliteStore>>,
    /// Sweeper shared by all trigger requests
    pub sweeper: Arc<Mutex<AlertSweeper>>,
}

impl AppState {
    /// Wrap a store and sweeper for sharing across handlers
    pub fn new(store: SqliteStore, sweeper: AlertSweeper) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            sweeper: Arc::new(Mutex::new(sweeper)),
        }
    }

    /// Run one alert pass at `now`
    pub fn run_pass(&self, now: u64) -> Result<PassReport, AppError> {
        let store = self
            .store
            .lock()
            .map_err(|_| AppError::InternalError("store lock poisoned".to_string()))?;
        let mut sweeper = self
            .sweeper
            .lock()
            .map_err(|_| AppError::InternalError("sweeper lock poisoned".to_string()))?;

        Ok(sweeper.sweep(&*store, &*store, &*store, now)?)
    }

    fn aging_summary(&self, now: u64) -> Result<AgingSummaryResponse, AppError> {
        let store = self
            .store
            .lock()
            .map_err(|_| AppError::InternalError("store lock poisoned".to_string()))?;
        let items = store.load_candidates(&ItemQuery::candidates(None))?;

        let mut counts = [0usize; AgingBucket::ALL.len()];
        let mut unclassifiable = 0;
        let mut needs_attention = 0;
        for item in &items {
            match item.compute_aging(now) {
                Some(aging) => {
                    counts[aging.bucket as usize] += 1;
                    if aging.needs_attention {
                        needs_attention += 1;
                    }
                }
                None => unclassifiable += 1,
            }
        }

        Ok(AgingSummaryResponse {
            now,
            total: items.len(),
            unclassifiable,
            needs_attention,
            buckets: AgingBucket::ALL
                .iter()
                .map(|bucket| BucketCount {
                    bucket: bucket.as_str().to_string(),
                    count: counts[*bucket as usize],
                })
                .collect(),
        })
    }
}

/// Alert pass request; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct RunPassRequest {
    /// Evaluation instant (seconds since Unix epoch); defaults to wall clock
    #[serde(default)]
    pub now: Option<u64>,
}

/// One emitted alert
#[derive(Debug, Serialize, Deserialize)]
pub struct AlertEventDto {
    /// Item identifier
    pub item_id: String,
    /// Bucket at the time of the alert
    pub bucket: String,
    /// Whole days in stock
    pub elapsed_days: u64,
    /// `7_DAY_WARNING` or `1_DAY_WARNING`
    pub trigger_reason: String,
    /// Pass instant
    pub emitted_at: u64,
}

impl From<&AlertEvent> for AlertEventDto {
    fn from(event: &AlertEvent) -> Self {
        Self {
            item_id: event.item_id().to_string(),
            bucket: event.bucket().as_str().to_string(),
            elapsed_days: event.elapsed_days(),
            trigger_reason: event.reason().as_str().to_string(),
            emitted_at: event.emitted_at(),
        }
    }
}

/// One item that failed during a pass
#[derive(Debug, Serialize, Deserialize)]
pub struct FailedItemDto {
    /// Item identifier
    pub item_id: String,
    /// Failure description
    pub error: String,
}

/// Alert pass response
#[derive(Debug, Serialize, Deserialize)]
pub struct RunPassResponse {
    /// Number of alerts emitted
    pub events_emitted: usize,
    /// Alerts emitted
    pub events: Vec<AlertEventDto>,
    /// Items not in stock or without an intake timestamp
    pub skipped: usize,
    /// Number of per-item failures
    pub failures: usize,
    /// Items refreshed without an alert
    pub refreshed: usize,
    /// Alerts already recorded by a concurrent pass
    pub suppressed: usize,
    /// Items modified by another writer during the pass
    pub changed: usize,
    /// Items left for the next pass by the deadline
    pub omitted: usize,
    /// Per-item failure details
    pub failed_items: Vec<FailedItemDto>,
}

impl From<&PassReport> for RunPassResponse {
    fn from(report: &PassReport) -> Self {
        Self {
            events_emitted: report.events_emitted(),
            events: report.events.iter().map(AlertEventDto::from).collect(),
            skipped: report.skipped,
            failures: report.failure_count(),
            refreshed: report.refreshed,
            suppressed: report.suppressed,
            changed: report.changed,
            omitted: report.omitted,
            failed_items: report
                .failures
                .iter()
                .map(|f| FailedItemDto {
                    item_id: f.item_id.to_string(),
                    error: f.kind.to_string(),
                })
                .collect(),
        }
    }
}

/// Aging summary query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    /// Evaluation instant (seconds since Unix epoch); defaults to wall clock
    pub now: Option<u64>,
}

/// Item count for one bucket
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketCount {
    /// Bucket name
    pub bucket: String,
    /// In-stock items in the bucket
    pub count: usize,
}

/// Aging summary response
#[derive(Debug, Serialize, Deserialize)]
pub struct AgingSummaryResponse {
    /// Evaluation instant
    pub now: u64,
    /// In-stock items considered
    pub total: usize,
    /// In-stock items without an intake timestamp
    pub unclassifiable: usize,
    /// Items at or past the attention threshold
    pub needs_attention: usize,
    /// Counts per bucket, youngest first
    pub buckets: Vec<BucketCount>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request body present but unusable
    BadRequest(String),
    /// The pass itself could not run
    PassError(SweeperError),
    /// Direct store access failed
    StoreError(StoreError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PassError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::StoreError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::error!("Request failed: {}", message);
        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<SweeperError> for AppError {
    fn from(e: SweeperError) -> Self {
        AppError::PassError(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreError(e)
    }
}

/// POST /alerts/run - Run one alert pass
///
/// Always answers 200 with counts once the pass runs, even if some items
/// failed; only a pass that cannot start is an error. An empty body runs
/// at wall-clock time; a body that is not a valid request answers 400.
async fn run_alert_pass(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RunPassResponse>, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RunPassRequest::default()
    } else {
        serde_json::from_slice::<RunPassRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };
    let now = request.now.unwrap_or_else(unix_now);

    let report = tokio::task::spawn_blocking(move || state.run_pass(now))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;

    Ok(Json(RunPassResponse::from(&report)))
}

/// GET /aging/summary - Bucket counts for in-stock items
async fn aging_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<AgingSummaryResponse>, AppError> {
    let now = params.now.unwrap_or_else(unix_now);

    let summary = tokio::task::spawn_blocking(move || state.aging_summary(now))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;

    Ok(Json(summary))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/alerts/run", post(run_alert_pass))
        .route("/aging/summary", get(aging_summary))
        .route("/health", get(health_check))
        .with_state(state)
}
