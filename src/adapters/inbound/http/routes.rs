use super::{ApiError, AppState};
use crate::credential_audit::domain::{ApplicationView, ThresholdSet};
use crate::ports::inbound::{RunOutcome, ServiceReport};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    /// Comma-separated day counts; bad tokens are ignored
    pub days: Option<String>,
}

/// Liveness only; touches nothing external
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationView>>, ApiError> {
    Ok(Json(state.list_applications().await?))
}

pub async fn list_expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<ApplicationView>>, ApiError> {
    let thresholds = ThresholdSet::parse_lenient(query.days.as_deref());
    Ok(Json(state.list_expiring(&thresholds).await?))
}

/// Runs the pipeline and waits for it. 409 if a run is already going.
pub async fn check_now(State(state): State<AppState>) -> Response {
    let outcome = state.run_immediate_check().await;
    let status = match &outcome {
        RunOutcome::Completed { .. } => StatusCode::OK,
        RunOutcome::Skipped => StatusCode::CONFLICT,
        RunOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(outcome)).into_response()
}

pub async fn test_services(
    State(state): State<AppState>,
) -> Result<Json<ServiceReport>, ApiError> {
    state
        .test_services()
        .await
        .map(Json)
        .map_err(ApiError::service_unavailable)
}
