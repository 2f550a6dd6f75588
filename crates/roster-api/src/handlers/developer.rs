// ============================================================================
// Roster API - Developer Portal Handlers
// File: crates/roster-api/src/handlers/developer.rs
// ============================================================================
//! Cross-tenant administration, reachable only with a developer session

use axum::{extract::State, http::StatusCode, response::Response, Json};
use tracing::info;
use validator::Validate;

use roster_core::domain::{AdminProfile, Employee, Tenant};
use roster_core::services::{TenantExport, TenantSummary};
use roster_security::SessionRole;

use super::{created, logout_response, ok, session_response, ApiResult};
use crate::dto::{
    ActivateBody, CreateTenantBody, DeveloperMe, LoginRequest, NewAdminBody, SubscriptionBody, TenantIdPath,
    UpdateTenantBody,
};
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, DeveloperSession};
use crate::response::{ApiResponse, Message};
use crate::state::AppState;

/// POST /api/developer/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    state
        .login_limiter
        .check(SessionRole::Developer, None, &payload.username)?;

    let result = state.auth.developer_login(&payload.username, &payload.password).await;
    state.metrics.record_login(SessionRole::Developer.as_str(), result.is_ok());
    Ok(session_response(&state, result?))
}

/// POST /api/developer/logout
pub async fn logout() -> Response {
    logout_response(SessionRole::Developer)
}

/// GET /api/developer/me
pub async fn me(session: DeveloperSession) -> ApiResult<DeveloperMe> {
    ok(DeveloperMe {
        username: session.username,
    })
}

/// GET /api/developer/tenants
pub async fn list_tenants(State(state): State<AppState>, _session: DeveloperSession) -> ApiResult<Vec<TenantSummary>> {
    ok(state.tenants.list_with_stats().await?)
}

/// POST /api/developer/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    session: DeveloperSession,
    AppJson(payload): AppJson<CreateTenantBody>,
) -> Result<(StatusCode, Json<ApiResponse<Tenant>>), ApiError> {
    payload.validate()?;
    let tenant = state.tenants.create(payload.into()).await?;
    info!("Developer {} created tenant {}", session.username, tenant.slug);
    created(tenant)
}

/// GET /api/developer/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<Tenant> {
    ok(state.tenants.get(&path.id).await?)
}

/// PATCH /api/developer/tenants/{id}
pub async fn update_tenant(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
    AppJson(payload): AppJson<UpdateTenantBody>,
) -> ApiResult<Tenant> {
    payload.validate()?;
    ok(state.tenants.update(&path.id, payload.into()).await?)
}

/// POST /api/developer/tenants/{id}/activate
pub async fn activate_tenant(
    State(state): State<AppState>,
    session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
    AppJson(payload): AppJson<ActivateBody>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.activate(&path.id, payload.plan).await?;
    info!("Developer {} activated tenant {}", session.username, tenant.slug);
    ok(tenant)
}

/// POST /api/developer/tenants/{id}/deactivate
pub async fn deactivate_tenant(
    State(state): State<AppState>,
    session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.deactivate(&path.id).await?;
    info!("Developer {} deactivated tenant {}", session.username, tenant.slug);
    ok(tenant)
}

/// POST /api/developer/tenants/{id}/subscription
pub async fn set_subscription(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
    AppJson(payload): AppJson<SubscriptionBody>,
) -> ApiResult<Tenant> {
    ok(state.tenants.set_subscription(&path.id, payload.plan).await?)
}

/// GET /api/developer/tenants/{id}/admins
pub async fn list_admins(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<Vec<AdminProfile>> {
    ok(state.tenants.list_admins(&path.id).await?)
}

/// POST /api/developer/tenants/{id}/admins
pub async fn add_admin(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
    AppJson(payload): AppJson<NewAdminBody>,
) -> Result<(StatusCode, Json<ApiResponse<AdminProfile>>), ApiError> {
    payload.validate()?;
    created(state.tenants.add_admin(&path.id, payload.into()).await?)
}

/// GET /api/developer/tenants/{id}/employees
pub async fn list_employees(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<Vec<Employee>> {
    ok(state.tenants.list_employees(&path.id).await?)
}

/// GET /api/developer/tenants/{id}/export
pub async fn export_tenant(
    State(state): State<AppState>,
    _session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<TenantExport> {
    ok(state.tenants.export(&path.id).await?)
}

/// POST /api/developer/tenants/{id}/reset
pub async fn reset_tenant(
    State(state): State<AppState>,
    session: DeveloperSession,
    AppPath(path): AppPath<TenantIdPath>,
) -> ApiResult<Message> {
    state.tenants.reset(&path.id).await?;
    info!("Developer {} reset tenant {}", session.username, path.id);
    ok(Message::new("Tenant data reset"))
}
