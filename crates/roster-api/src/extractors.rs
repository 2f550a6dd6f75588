// ============================================================================
// Roster API - Extractors
// File: crates/roster-api/src/extractors.rs
// ============================================================================
//! Tenant resolution, session gates and envelope-aware body extractors

use axum::{
    extract::{FromRequest, FromRequestParts, OriginalUri},
    http::{
        header::{COOKIE, HOST},
        request::Parts,
    },
};
use tracing::debug;

use roster_core::domain::Tenant;
use roster_core::error::DomainError;
use roster_core::resolver::resolve_slug;
use roster_security::session::read_cookie;
use roster_security::{SessionClaims, SessionRole};

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejections render as the API envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// The active tenant named by the `/api/t/{slug}` prefix or the Host
/// subdomain.
pub struct ResolvedTenant(pub Tenant);

impl FromRequestParts<AppState> for ResolvedTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let host = parts.headers.get(HOST).and_then(|h| h.to_str().ok());

        let slug = resolve_slug(&path, host, &state.config.app.base_domain).ok_or_else(|| {
            debug!("No tenant in path {} or host {:?}", path, host);
            DomainError::TenantNotFound
        })?;
        Ok(Self(state.tenants.resolve(&slug).await?))
    }
}

fn session_claims(
    parts: &Parts,
    state: &AppState,
    role: SessionRole,
    tenant: Option<&Tenant>,
) -> Result<SessionClaims, ApiError> {
    let token = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|h| read_cookie(h, role.cookie_name()))
        .ok_or_else(|| ApiError::Unauthorized(format!("{} session required", role)))?;
    Ok(state.auth.authorize(token, role, tenant.map(|t| t.id))?)
}

pub struct DeveloperSession {
    pub username: String,
}

impl FromRequestParts<AppState> for DeveloperSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = session_claims(parts, state, SessionRole::Developer, None)?;
        Ok(Self { username: claims.sub })
    }
}

/// An admin signed in to the tenant the request resolves to.
pub struct AdminSession {
    pub tenant: Tenant,
    pub username: String,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ResolvedTenant(tenant) = ResolvedTenant::from_request_parts(parts, state).await?;
        let claims = session_claims(parts, state, SessionRole::Admin, Some(&tenant))?;
        Ok(Self {
            tenant,
            username: claims.sub,
        })
    }
}

pub struct EmployeeSession {
    pub tenant: Tenant,
    pub employee_id: String,
}

impl FromRequestParts<AppState> for EmployeeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ResolvedTenant(tenant) = ResolvedTenant::from_request_parts(parts, state).await?;
        let claims = session_claims(parts, state, SessionRole::Employee, Some(&tenant))?;
        Ok(Self {
            tenant,
            employee_id: claims.sub,
        })
    }
}
