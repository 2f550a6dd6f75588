// ============================================================================
// Roster API - Router
// File: crates/roster-api/src/routes.rs
// ============================================================================

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, developer, employee, health, public, requests, workspace};
use crate::metrics::track_http;
use crate::state::AppState;

/// Full API. Tenant routes are served twice: under `/api` for
/// subdomain resolution and under `/api/t/{tenant}` for path resolution.
pub fn build_router(state: AppState) -> Router {
    let tenant = tenant_routes();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/public", public_routes())
        .nest("/api/developer", developer_routes())
        .nest("/api/t/{tenant}", tenant.clone())
        .nest("/api", tenant)
        .route_layer(middleware::from_fn_with_state(state.clone(), track_http))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(public::signup))
        .route("/tenants/{slug}", get(public::tenant_info))
}

fn developer_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(developer::login))
        .route("/logout", post(developer::logout))
        .route("/me", get(developer::me))
        .route("/tenants", get(developer::list_tenants).post(developer::create_tenant))
        .route("/tenants/{id}", get(developer::get_tenant).patch(developer::update_tenant))
        .route("/tenants/{id}/activate", post(developer::activate_tenant))
        .route("/tenants/{id}/deactivate", post(developer::deactivate_tenant))
        .route("/tenants/{id}/subscription", post(developer::set_subscription))
        .route("/tenants/{id}/admins", get(developer::list_admins).post(developer::add_admin))
        .route("/tenants/{id}/employees", get(developer::list_employees))
        .route("/tenants/{id}/export", get(developer::export_tenant))
        .route("/tenants/{id}/reset", post(developer::reset_tenant))
}

fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/tenant", get(public::current_tenant))
        // Admin portal
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/me", get(admin::me))
        .route("/admin/organization", get(admin::organization).put(admin::update_organization))
        .route("/admin/roster", get(admin::roster))
        .route("/admin/teams", post(admin::add_team).delete(admin::delete_team))
        .route("/admin/teams/{name}", put(admin::rename_team))
        .route("/admin/employees", post(admin::add_employee))
        .route("/admin/employees/{id}", put(admin::edit_employee))
        .route("/admin/employees/{id}/deactivate", post(admin::deactivate_employee))
        .route("/admin/employees/{id}/reactivate", post(admin::reactivate_employee))
        .route(
            "/admin/employees/{id}/profile",
            get(admin::employee_profile).put(admin::update_employee_profile),
        )
        .route("/admin/employees/{id}/password-link", post(admin::password_link))
        .route("/admin/shifts", put(admin::update_shift))
        .route("/admin/csv/import", post(workspace::import_csv))
        .route("/admin/csv/export", get(workspace::export_csv))
        .route("/admin/modifications", get(workspace::modifications))
        .route(
            "/admin/shift-definitions",
            get(workspace::shift_definitions)
                .post(workspace::upsert_shift_definition)
                .put(workspace::replace_shift_definitions),
        )
        .route("/admin/shift-definitions/{code}", delete(workspace::delete_shift_definition))
        .route("/admin/sheet-links", get(workspace::sheet_links).post(workspace::save_sheet_link))
        .route("/admin/sheet-links/{month}", delete(workspace::delete_sheet_link))
        .route("/admin/sheet-links/{month}/sync", post(workspace::sync_sheet))
        .route("/admin/requests", get(requests::list))
        .route("/admin/requests/pending", get(requests::pending))
        .route("/admin/requests/{id}/resolve", post(requests::resolve))
        // Employee portal
        .route("/employee/login", post(employee::login))
        .route("/employee/logout", post(employee::logout))
        .route("/employee/me", get(employee::me))
        .route("/employee/roster", get(employee::roster))
        .route("/employee/schedule", get(employee::schedule))
        .route("/employee/profile", get(employee::profile).put(employee::update_profile))
        .route("/employee/notifications", get(employee::notifications))
        .route("/employee/notifications/read", post(employee::mark_notifications_read))
        .route("/employee/password", post(employee::change_password))
        .route("/employee/password/reset", post(employee::reset_password))
        .route("/employee/requests", get(requests::mine))
        .route("/employee/requests/shift-change", post(requests::submit_shift_change))
        .route("/employee/requests/swap", post(requests::submit_swap))
}
