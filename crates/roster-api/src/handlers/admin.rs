// ============================================================================
// Roster API - Tenant Admin Handlers
// File: crates/roster-api/src/handlers/admin.rs
// ============================================================================
//! Admin session, teams, employees and single-cell shift edits

use axum::{extract::State, http::StatusCode, response::Response, Json};
use tracing::info;
use validator::Validate;

use roster_core::domain::{Employee, EmployeeProfile, Roster};
use roster_core::services::{
    EmployeeUpdate, NewEmployee, PasswordLinkIssued, ProfileView, PublicTenantInfo, ShiftUpdate,
};
use roster_security::SessionRole;

use super::{created, logout_response, ok, session_response, ApiResult};
use crate::dto::{
    AdminMe, IdPath, LoginRequest, NamePath, OrganizationBody, PasswordLinkRequest, ReactivateBody, RenameTeamBody,
    ShiftUpdated, TeamBody,
};
use crate::error::ApiError;
use crate::extractors::{AdminSession, AppJson, AppPath, ResolvedTenant};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST admin/login
pub async fn login(
    State(state): State<AppState>,
    ResolvedTenant(tenant): ResolvedTenant,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    state
        .login_limiter
        .check(SessionRole::Admin, Some(&tenant.slug), &payload.username)?;

    let result = state.auth.admin_login(&tenant, &payload.username, &payload.password).await;
    state.metrics.record_login(SessionRole::Admin.as_str(), result.is_ok());
    Ok(session_response(&state, result?))
}

/// POST admin/logout
pub async fn logout() -> Response {
    logout_response(SessionRole::Admin)
}

/// GET admin/me
pub async fn me(session: AdminSession) -> ApiResult<AdminMe> {
    ok(AdminMe {
        tenant: PublicTenantInfo::from(&session.tenant),
        username: session.username,
    })
}

/// GET admin/organization
pub async fn organization(State(state): State<AppState>, session: AdminSession) -> ApiResult<OrganizationBody> {
    ok(OrganizationBody {
        organization_name: state.tenants.organization_name(&session.tenant.id).await?,
    })
}

/// PUT admin/organization
pub async fn update_organization(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<OrganizationBody>,
) -> ApiResult<OrganizationBody> {
    payload.validate()?;
    let organization_name = state
        .tenants
        .set_organization_name(&session.tenant.id, &payload.organization_name)
        .await?;
    info!("{} renamed organization of {}", session.username, session.tenant.slug);
    ok(OrganizationBody { organization_name })
}

/// GET admin/roster
pub async fn roster(State(state): State<AppState>, session: AdminSession) -> ApiResult<Roster> {
    ok(state.roster.roster(&session.tenant.id).await?)
}

/// POST admin/teams
pub async fn add_team(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<TeamBody>,
) -> ApiResult<Roster> {
    payload.validate()?;
    ok(state.roster.add_team(&session.tenant.id, &payload.name).await?)
}

/// PUT admin/teams/{name}
pub async fn rename_team(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<NamePath>,
    AppJson(payload): AppJson<RenameTeamBody>,
) -> ApiResult<Roster> {
    payload.validate()?;
    ok(state
        .roster
        .rename_team(&session.tenant.id, &path.name, &payload.new_name)
        .await?)
}

/// DELETE admin/teams
pub async fn delete_team(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<TeamBody>,
) -> ApiResult<Roster> {
    payload.validate()?;
    let roster = state.roster.delete_team(&session.tenant.id, &payload.name).await?;
    info!("{} deleted team {} on {}", session.username, payload.name, session.tenant.slug);
    ok(roster)
}

/// POST admin/employees
pub async fn add_employee(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<NewEmployee>,
) -> Result<(StatusCode, Json<ApiResponse<Employee>>), ApiError> {
    created(state.roster.add_employee(&session.tenant, payload).await?)
}

/// PUT admin/employees/{id}
pub async fn edit_employee(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
    AppJson(payload): AppJson<EmployeeUpdate>,
) -> ApiResult<Employee> {
    ok(state.roster.edit_employee(&session.tenant.id, &path.id, payload).await?)
}

/// POST admin/employees/{id}/deactivate
pub async fn deactivate_employee(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
) -> ApiResult<Employee> {
    let employee = state.roster.deactivate_employee(&session.tenant.id, &path.id).await?;
    info!("{} deactivated {} on {}", session.username, employee.id, session.tenant.slug);
    ok(employee)
}

/// POST admin/employees/{id}/reactivate
pub async fn reactivate_employee(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
    AppJson(payload): AppJson<ReactivateBody>,
) -> ApiResult<Employee> {
    payload.validate()?;
    ok(state
        .roster
        .reactivate_employee(&session.tenant.id, &path.id, &payload.team)
        .await?)
}

/// GET admin/employees/{id}/profile
pub async fn employee_profile(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
) -> ApiResult<ProfileView> {
    ok(state.roster.employee_profile(&session.tenant.id, &path.id).await?)
}

/// PUT admin/employees/{id}/profile
pub async fn update_employee_profile(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
    AppJson(payload): AppJson<EmployeeProfile>,
) -> ApiResult<ProfileView> {
    ok(state
        .roster
        .update_employee_profile(&session.tenant.id, &path.id, payload)
        .await?)
}

/// POST admin/employees/{id}/password-link
pub async fn password_link(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<IdPath>,
    AppJson(payload): AppJson<PasswordLinkRequest>,
) -> ApiResult<PasswordLinkIssued> {
    payload.validate()?;
    ok(state
        .auth
        .issue_password_link(&session.tenant, &path.id, payload.email)
        .await?)
}

/// PUT admin/shifts
pub async fn update_shift(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<ShiftUpdate>,
) -> ApiResult<ShiftUpdated> {
    let modification = state
        .roster
        .update_shift(&session.tenant.id, payload, &session.username)
        .await?;
    ok(ShiftUpdated {
        changed: modification.is_some(),
        modification,
    })
}
