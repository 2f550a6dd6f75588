//! HTTP handlers grouped by portal

pub mod admin;
pub mod developer;
pub mod employee;
pub mod health;
pub mod public;
pub mod requests;
pub mod workspace;

use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use roster_core::services::SessionGrant;
use roster_security::session::{clear_cookie, session_cookie};
use roster_security::SessionRole;

use crate::error::ApiError;
use crate::response::{ApiResponse, Message};
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn created<T: Serialize>(data: T) -> Result<(StatusCode, Json<ApiResponse<T>>), ApiError> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Sets the role's session cookie and returns the grant.
pub(crate) fn session_response(state: &AppState, grant: SessionGrant) -> Response {
    let cookie = session_cookie(
        grant.role.cookie_name(),
        &grant.token,
        grant.expires_in,
        state.secure_cookies(),
    );
    ([(SET_COOKIE, cookie)], Json(ApiResponse::success(grant))).into_response()
}

pub(crate) fn logout_response(role: SessionRole) -> Response {
    (
        [(SET_COOKIE, clear_cookie(role.cookie_name()))],
        Json(ApiResponse::success(Message::new("Logged out"))),
    )
        .into_response()
}
