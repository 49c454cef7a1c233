//! HTTP API for the Pipbook daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Calculators (position size, risk/reward, pip value)
//! - Trade journal (CRUD)
//! - Analytics (overview, wins by tag, monthly performance)
//!
//! Every `/api` response is wrapped in [`ApiResponse`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use pipbook_domain::{NewTrade, Pair, Trade, TradeStatus, TradeUpdate};
use pipbook_engine::{
    AnalyticsSummary, MonthlyPerformance, PipValueInfo, PositionSizingRequest,
    PositionSizingResult, RiskRewardRequest, RiskRewardResult, TagStats,
};
use pipbook_store::{StoreError, TradeFilter, TradeRepository};

use crate::error::DaemonError;
use crate::journal::Journal;

/// Months covered by monthly performance when the request gives none
pub const DEFAULT_PERFORMANCE_MONTHS: u32 = 12;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: TradeRepository + 'static> {
    pub journal: Arc<Journal<S>>,
    /// User id applied when a request does not name one
    pub default_user: String,
    /// Listing page size when a request does not give one
    pub trade_list_limit: usize,
}

impl<S: TradeRepository + 'static> ApiState<S> {
    fn user_or_default(&self, user_id: Option<String>) -> String {
        user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_user.clone())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response envelope shared by all `/api` endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Successful response carrying `data` and a message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    /// Failed response
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Root response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Identifies the caller's journal.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// Trade listing filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTradesQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub pair: Option<String>,
    pub limit: Option<usize>,
}

/// Monthly performance window.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuery {
    pub user_id: Option<String>,
    pub months: Option<u32>,
}

/// Returned after logging a trade.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCreated {
    pub trade_id: Uuid,
}

/// A page of trades.
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeList {
    pub trades: Vec<Trade>,
    pub count: usize,
}

/// A single trade.
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeData {
    pub trade: Trade,
}

/// Win rate per tag.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinsByTagData {
    pub wins_by_tag: BTreeMap<String, TagStats>,
}

/// Profit per month.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPerformanceData {
    pub monthly_performance: Vec<MonthlyPerformance>,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: TradeRepository + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/calculator/position-size", post(position_size_handler))
        .route("/api/calculator/risk-reward", post(risk_reward_handler))
        .route("/api/calculator/pip-value/:pair", get(pip_value_handler))
        .route("/api/trades", post(create_trade_handler).get(list_trades_handler))
        .route(
            "/api/trades/:id",
            get(get_trade_handler).put(update_trade_handler).delete(delete_trade_handler),
        )
        .route("/api/analytics/overview", get(overview_handler))
        .route("/api/analytics/wins-by-tag", get(wins_by_tag_handler))
        .route("/api/analytics/monthly-performance", get(monthly_performance_handler))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Pipbook trading journal API".to_string(),
    })
}

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "pipbook".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Size a position from balance, risk and stop distance.
async fn position_size_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    payload: Result<Json<PositionSizingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PositionSizingResult>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Json(req) = payload.map_err(|e| rejected(e.status(), e.body_text()))?;

    let result = state
        .journal
        .calculator()
        .position_size(&req)
        .map_err(|e| to_error_response(e.into()))?;

    debug!(pair = %req.pair, lot_size = %result.lot_size, "Position sized");
    Ok(Json(ApiResponse::ok(result)))
}

/// Reward-to-risk ratio of a planned trade.
async fn risk_reward_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    payload: Result<Json<RiskRewardRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RiskRewardResult>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Json(req) = payload.map_err(|e| rejected(e.status(), e.body_text()))?;

    let result = state
        .journal
        .calculator()
        .risk_reward(&req)
        .map_err(|e| to_error_response(e.into()))?;

    Ok(Json(ApiResponse::ok(result)))
}

/// Pip semantics of one pair (`EURUSD`, `eur-usd` or `EUR%2FUSD`).
async fn pip_value_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    Path(pair): Path<String>,
) -> Result<Json<ApiResponse<PipValueInfo>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let info = state
        .journal
        .calculator()
        .pip_value(&pair)
        .map_err(|e| to_error_response(e.into()))?;

    Ok(Json(ApiResponse::ok(info)))
}

/// Log a new trade.
async fn create_trade_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    query: Result<Query<UserQuery>, QueryRejection>,
    payload: Result<Json<NewTrade>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TradeCreated>>), ApiError>
where
    S: TradeRepository + 'static,
{
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let Json(new_trade) = payload.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    let trade = state
        .journal
        .create(&user_id, new_trade)
        .await
        .map_err(to_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            TradeCreated { trade_id: trade.id },
            "Trade created successfully",
        )),
    ))
}

/// List the caller's trades.
async fn list_trades_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    query: Result<Query<ListTradesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TradeList>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;

    let limit = query.limit.unwrap_or(state.trade_list_limit);
    if limit == 0 {
        return Err(to_error_response(DaemonError::BadRequest(
            "limit must be positive".to_string(),
        )));
    }

    let mut filter = TradeFilter::for_user(state.user_or_default(query.user_id)).with_limit(limit);
    if let Some(status) = query.status.as_deref() {
        let status = TradeStatus::parse(status).map_err(|e| to_error_response(e.into()))?;
        filter = filter.with_status(status);
    }
    if let Some(pair) = query.pair.as_deref() {
        let pair = Pair::parse(pair).map_err(|e| to_error_response(e.into()))?;
        filter = filter.with_pair(pair);
    }

    let trades = state.journal.list(&filter).await.map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok(TradeList {
        count: trades.len(),
        trades,
    })))
}

/// Get one of the caller's trades.
async fn get_trade_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TradeData>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Path(id) = id.map_err(|e| rejected(e.status(), e.body_text()))?;
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    let trade = state.journal.get(&user_id, id).await.map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok(TradeData { trade })))
}

/// Update (usually close) one of the caller's trades.
async fn update_trade_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
    payload: Result<Json<TradeUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<TradeData>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Path(id) = id.map_err(|e| rejected(e.status(), e.body_text()))?;
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let Json(update) = payload.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    let trade = state
        .journal
        .update(&user_id, id, update)
        .await
        .map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok_with_message(
        TradeData { trade },
        "Trade updated successfully",
    )))
}

/// Delete one of the caller's trades.
async fn delete_trade_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Path(id) = id.map_err(|e| rejected(e.status(), e.body_text()))?;
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    state.journal.delete(&user_id, id).await.map_err(to_error_response)?;

    Ok(Json(ApiResponse::message("Trade deleted successfully")))
}

/// Summary statistics of the caller's journal.
async fn overview_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<AnalyticsSummary>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    let summary = state.journal.overview(&user_id).await.map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok(summary)))
}

async fn wins_by_tag_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<WinsByTagData>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let user_id = state.user_or_default(query.user_id);

    let wins_by_tag = state.journal.wins_by_tag(&user_id).await.map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok(WinsByTagData { wins_by_tag })))
}

async fn monthly_performance_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    query: Result<Query<MonthlyQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MonthlyPerformanceData>>, ApiError>
where
    S: TradeRepository + 'static,
{
    let Query(query) = query.map_err(|e| rejected(e.status(), e.body_text()))?;
    let months = query.months.unwrap_or(DEFAULT_PERFORMANCE_MONTHS);
    let user_id = state.user_or_default(query.user_id);

    let monthly_performance = state
        .journal
        .monthly_performance(&user_id, months)
        .await
        .map_err(to_error_response)?;

    Ok(Json(ApiResponse::ok(MonthlyPerformanceData {
        monthly_performance,
    })))
}

// =============================================================================
// Helpers
// =============================================================================

fn status_for(error: &DaemonError) -> StatusCode {
    match error {
        DaemonError::TradeNotFound(_) | DaemonError::Store(StoreError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        },
        DaemonError::AccessDenied(_) => StatusCode::FORBIDDEN,
        DaemonError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        DaemonError::Calc(_) | DaemonError::Domain(_) | DaemonError::BadRequest(_) => {
            StatusCode::BAD_REQUEST
        },
        DaemonError::Store(_) | DaemonError::Io(_) | DaemonError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        },
    }
}

fn to_error_response(error: DaemonError) -> ApiError {
    let status = status_for(&error);

    if status.is_server_error() {
        error!(error = %error, "Request failed");
    } else {
        warn!(error = %error, status = status.as_u16(), "Request rejected");
    }

    (status, Json(ApiResponse::failure(error.to_string())))
}

/// Extractor rejections keep axum's status but use the envelope.
fn rejected(status: StatusCode, body_text: String) -> ApiError {
    warn!(status = status.as_u16(), reason = %body_text, "Malformed request");
    (status, Json(ApiResponse::failure(body_text)))
}

// =============================================================================
// Tests
// =============================================================================
