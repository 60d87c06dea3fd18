use super::state::{deserialize_optional_date, today_or_local, AppState};
use crate::policies::{
    apply, dashboard_summary, due_payments, extract_facets, DashboardSummary, DuePaymentsView,
    FacetVocabulary, FilterSelection, NormalizedPolicy, PolicyScreen, RawPolicyRecord, SortKey,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct PolicyViewRequest {
    pub records: Vec<RawPolicyRecord>,
    #[serde(default)]
    pub selection: FilterSelection,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub screen: PolicyScreen,
}

#[derive(Debug, Serialize)]
pub struct PolicyViewResponse {
    pub today: NaiveDate,
    pub screen: PolicyScreen,
    pub total: usize,
    pub selection: FilterSelection,
    pub sort: SortKey,
    pub facets: FacetVocabulary,
    pub policies: Vec<NormalizedPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct FacetsRequest {
    pub records: Vec<RawPolicyRecord>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub screen: PolicyScreen,
}

#[derive(Debug, Deserialize)]
pub struct DuePaymentsRequest {
    pub records: Vec<RawPolicyRecord>,
    #[serde(default)]
    pub selection: FilterSelection,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DuePaymentsResponse {
    pub today: NaiveDate,
    pub facets: FacetVocabulary,
    #[serde(flatten)]
    pub view: DuePaymentsView,
}

#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    pub records: Vec<RawPolicyRecord>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub upcoming_limit: Option<usize>,
}

pub fn policy_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/policies/view", post(policy_view_endpoint))
        .route("/api/v1/policies/facets", post(facets_endpoint))
        .route("/api/v1/policies/due", post(due_payments_endpoint))
        .route("/api/v1/policies/dashboard", post(dashboard_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn policy_view_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<PolicyViewRequest>,
) -> Json<PolicyViewResponse> {
    let PolicyViewRequest {
        records,
        mut selection,
        sort,
        today,
        screen,
    } = payload;

    let today = today_or_local(today);
    let normalized = state.normalize(screen, today, records);
    let facets = extract_facets(&normalized);
    selection.retain_available(&facets);
    let policies = apply(&normalized, &selection, sort);
    debug!(
        screen = screen.label(),
        sort = sort.label(),
        filtered = !selection.is_unfiltered(),
        total = normalized.len(),
        shown = policies.len(),
        "policy view computed"
    );

    Json(PolicyViewResponse {
        today,
        screen,
        total: normalized.len(),
        selection,
        sort,
        facets,
        policies,
    })
}

pub(crate) async fn facets_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<FacetsRequest>,
) -> Json<FacetVocabulary> {
    let today = today_or_local(payload.today);
    let normalized = state.normalize(payload.screen, today, payload.records);
    Json(extract_facets(&normalized))
}

pub(crate) async fn due_payments_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DuePaymentsRequest>,
) -> Json<DuePaymentsResponse> {
    let DuePaymentsRequest {
        records,
        mut selection,
        sort,
        today,
    } = payload;

    let today = today_or_local(today);
    let normalized = state.normalize(PolicyScreen::DuePayments, today, records);
    let facets = extract_facets(&normalized);
    selection.retain_available(&facets);
    let view = due_payments(&normalized, &selection, sort);

    Json(DuePaymentsResponse {
        today,
        facets,
        view,
    })
}

pub(crate) async fn dashboard_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DashboardRequest>,
) -> Json<DashboardSummary> {
    let today = today_or_local(payload.today);
    let limit = payload
        .upcoming_limit
        .unwrap_or(state.display.upcoming_limit);
    let normalized = state.normalize(PolicyScreen::Dashboard, today, payload.records);
    Json(dashboard_summary(&normalized, today, limit))
}
