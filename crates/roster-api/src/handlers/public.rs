use axum::{extract::State, http::StatusCode, Json};
use tracing::info;
use validator::Validate;

use roster_core::services::PublicTenantInfo;

use super::{created, ok, ApiResult};
use crate::dto::{SignupBody, SlugPath};
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, ResolvedTenant};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/public/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupBody>,
) -> Result<(StatusCode, Json<ApiResponse<PublicTenantInfo>>), ApiError> {
    payload.validate()?;
    let tenant = state.tenants.signup(payload.into()).await?;
    info!("Signup received for {}", tenant.slug);
    created(PublicTenantInfo::from(&tenant))
}

/// GET /api/public/tenants/{slug}
pub async fn tenant_info(
    State(state): State<AppState>,
    AppPath(path): AppPath<SlugPath>,
) -> ApiResult<PublicTenantInfo> {
    ok(state.tenants.public_info(&path.slug).await?)
}

/// GET /api[/t/{tenant}]/tenant
pub async fn current_tenant(ResolvedTenant(tenant): ResolvedTenant) -> ApiResult<PublicTenantInfo> {
    ok(PublicTenantInfo::from(&tenant))
}
