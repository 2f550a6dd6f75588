use axum::{extract::State, http::StatusCode, Json};
use tracing::info;
use validator::Validate;

use roster_core::domain::ScheduleRequest;
use roster_core::services::{PendingRequests, ShiftChangeInput, SwapInput};

use super::{created, ok, ApiResult};
use crate::dto::{IdPath, ResolveRequestBody};
use crate::error::ApiError;
use crate::extractors::{AdminSession, AppJson, AppPath, EmployeeSession};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET admin/requests
pub async fn list(State(state): State<AppState>, session: AdminSession) -> ApiResult<Vec<ScheduleRequest>> {
    ok(state.requests.list(&session.tenant.id).await?)
}

/// GET admin/requests/pending
pub async fn pending(State(state): State<AppState>, session: AdminSession) -> ApiResult<PendingRequests> {
    ok(state.requests.pending(&session.tenant.id).await?)
}

/// POST admin/requests/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
    AppJson(payload): AppJson<ResolveRequestBody>,
) -> ApiResult<ScheduleRequest> {
    payload.validate()?;
    let request = state
        .requests
        .resolve(
            &session.tenant.id,
            &path.id,
            payload.decision,
            &session.username,
            payload.message,
        )
        .await?;
    state.metrics.record_decision(request.status.as_str());
    info!("{} resolved {} on {}", session.username, request.id, session.tenant.slug);
    ok(request)
}

/// GET employee/requests
pub async fn mine(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<Vec<ScheduleRequest>> {
    ok(state
        .requests
        .for_employee(&session.tenant.id, &session.employee_id)
        .await?)
}

/// POST employee/requests/shift-change
pub async fn submit_shift_change(
    State(state): State<AppState>,
    session: EmployeeSession,
    AppJson(payload): AppJson<ShiftChangeInput>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduleRequest>>), ApiError> {
    created(
        state
            .requests
            .submit_shift_change(&session.tenant.id, &session.employee_id, payload)
            .await?,
    )
}

/// POST employee/requests/swap
pub async fn submit_swap(
    State(state): State<AppState>,
    session: EmployeeSession,
    AppJson(payload): AppJson<SwapInput>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduleRequest>>), ApiError> {
    created(
        state
            .requests
            .submit_swap(&session.tenant.id, &session.employee_id, payload)
            .await?,
    )
}
