// ============================================================================
// Roster API - Employee Handlers
// File: crates/roster-api/src/handlers/employee.rs
// ============================================================================

use axum::{extract::State, response::Response};
use tracing::info;
use validator::Validate;

use roster_core::domain::{EmployeeProfile, NotificationFeed, Roster};
use roster_core::services::{EmployeeSchedule, ProfileView, PublicTenantInfo};
use roster_security::SessionRole;

use super::{logout_response, ok, session_response, ApiResult};
use crate::dto::{ChangePasswordRequest, EmployeeLoginRequest, EmployeeMe, NotificationsRead, ResetPasswordRequest};
use crate::error::ApiError;
use crate::extractors::{AppJson, EmployeeSession, ResolvedTenant};
use crate::response::Message;
use crate::state::AppState;

/// POST employee/login
pub async fn login(
    State(state): State<AppState>,
    ResolvedTenant(tenant): ResolvedTenant,
    AppJson(payload): AppJson<EmployeeLoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    state
        .login_limiter
        .check(SessionRole::Employee, Some(&tenant.slug), &payload.employee_id)?;

    let result = state
        .auth
        .employee_login(&tenant, &payload.employee_id, &payload.password)
        .await;
    state.metrics.record_login(SessionRole::Employee.as_str(), result.is_ok());
    Ok(session_response(&state, result?))
}

/// POST employee/logout
pub async fn logout() -> Response {
    logout_response(SessionRole::Employee)
}

/// GET employee/me
pub async fn me(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<EmployeeMe> {
    let schedule = state
        .roster
        .employee_schedule(&session.tenant.id, &session.employee_id)
        .await?;
    ok(EmployeeMe {
        employee_id: schedule.employee_id,
        name: schedule.name,
        team: schedule.team,
        tenant: PublicTenantInfo::from(&session.tenant),
    })
}

/// GET employee/roster
pub async fn roster(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<Roster> {
    ok(state.roster.roster(&session.tenant.id).await?)
}

/// GET employee/schedule
pub async fn schedule(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<EmployeeSchedule> {
    ok(state
        .roster
        .employee_schedule(&session.tenant.id, &session.employee_id)
        .await?)
}

/// GET employee/notifications
pub async fn notifications(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<NotificationFeed> {
    ok(state
        .requests
        .notifications(&session.tenant.id, &session.employee_id)
        .await?)
}

/// POST employee/notifications/read
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    session: EmployeeSession,
) -> ApiResult<NotificationsRead> {
    let last_read_at = state
        .requests
        .mark_notifications_read(&session.tenant.id, &session.employee_id)
        .await?;
    ok(NotificationsRead { last_read_at })
}

/// GET employee/profile
pub async fn profile(State(state): State<AppState>, session: EmployeeSession) -> ApiResult<ProfileView> {
    ok(state
        .roster
        .employee_profile(&session.tenant.id, &session.employee_id)
        .await?)
}

/// PUT employee/profile
pub async fn update_profile(
    State(state): State<AppState>,
    session: EmployeeSession,
    AppJson(payload): AppJson<EmployeeProfile>,
) -> ApiResult<ProfileView> {
    ok(state
        .roster
        .update_own_profile(&session.tenant.id, &session.employee_id, payload)
        .await?)
}

/// POST employee/password
pub async fn change_password(
    State(state): State<AppState>,
    session: EmployeeSession,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> ApiResult<Message> {
    payload.validate()?;
    state
        .auth
        .change_employee_password(
            &session.tenant.id,
            &session.employee_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;
    ok(Message::new("Password updated"))
}

/// POST employee/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ResolvedTenant(tenant): ResolvedTenant,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> ApiResult<Message> {
    payload.validate()?;
    let employee_id = state
        .auth
        .reset_password_with_token(&tenant.id, &payload.token, &payload.new_password)
        .await?;
    info!("Password set via link for {} on {}", employee_id, tenant.slug);
    ok(Message::new("Password set, you can now sign in"))
}
