//! CSV exchange, audit overview, shift definitions and published-sheet links

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::info;
use validator::Validate;

use roster_core::domain::ModificationOverview;
use roster_core::roster_csv::ImportSummary;

use super::{ok, ApiResult};
use crate::dto::{CodePath, ExportQuery, MonthPath, MonthQuery, SheetLinkBody, ShiftDefinitionBody, ShiftDefinitionsBody};
use crate::error::ApiError;
use crate::extractors::{AdminSession, AppJson, AppPath, AppQuery};
use crate::state::AppState;

/// POST admin/csv/import (body: CSV text)
pub async fn import_csv(State(state): State<AppState>, session: AdminSession, body: String) -> ApiResult<ImportSummary> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("CSV body is empty".into()));
    }
    let summary = state.roster.import_csv(&session.tenant.id, &body).await?;
    info!("{} imported CSV on {}: {} rows", session.username, session.tenant.slug, summary.rows);
    ok(summary)
}

/// GET admin/csv/export?months=YYYY-MM,...
pub async fn export_csv(
    State(state): State<AppState>,
    session: AdminSession,
    AppQuery(query): AppQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let csv = state
        .roster
        .export_csv(&session.tenant.id, &query.month_list())
        .await?;
    let disposition = format!("attachment; filename=\"{}-roster.csv\"", session.tenant.slug);
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// GET admin/modifications?month=YYYY-MM
pub async fn modifications(
    State(state): State<AppState>,
    session: AdminSession,
    AppQuery(query): AppQuery<MonthQuery>,
) -> ApiResult<ModificationOverview> {
    ok(state
        .roster
        .modifications(&session.tenant.id, query.month.as_deref())
        .await?)
}

/// GET admin/shift-definitions
pub async fn shift_definitions(
    State(state): State<AppState>,
    session: AdminSession,
) -> ApiResult<BTreeMap<String, String>> {
    ok(state.roster.shift_definitions(&session.tenant.id).await?)
}

/// POST admin/shift-definitions
pub async fn upsert_shift_definition(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<ShiftDefinitionBody>,
) -> ApiResult<BTreeMap<String, String>> {
    payload.validate()?;
    ok(state
        .roster
        .upsert_shift_definition(&session.tenant.id, &payload.code, &payload.description)
        .await?)
}

/// PUT admin/shift-definitions
pub async fn replace_shift_definitions(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<ShiftDefinitionsBody>,
) -> ApiResult<BTreeMap<String, String>> {
    ok(state
        .roster
        .replace_shift_definitions(&session.tenant.id, payload.definitions)
        .await?)
}

/// DELETE admin/shift-definitions/{code}
pub async fn delete_shift_definition(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<CodePath>,
) -> ApiResult<BTreeMap<String, String>> {
    ok(state
        .roster
        .delete_shift_definition(&session.tenant.id, &path.code)
        .await?)
}

/// GET admin/sheet-links
pub async fn sheet_links(State(state): State<AppState>, session: AdminSession) -> ApiResult<BTreeMap<String, String>> {
    ok(state.roster.sheet_links(&session.tenant.id).await?)
}

/// POST admin/sheet-links
pub async fn save_sheet_link(
    State(state): State<AppState>,
    session: AdminSession,
    AppJson(payload): AppJson<SheetLinkBody>,
) -> ApiResult<BTreeMap<String, String>> {
    payload.validate()?;
    ok(state
        .roster
        .save_sheet_link(&session.tenant.id, &payload.month, &payload.url)
        .await?)
}

/// DELETE admin/sheet-links/{month}
pub async fn delete_sheet_link(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<MonthPath>,
) -> ApiResult<BTreeMap<String, String>> {
    ok(state.roster.delete_sheet_link(&session.tenant.id, &path.month).await?)
}

/// POST admin/sheet-links/{month}/sync
pub async fn sync_sheet(
    State(state): State<AppState>,
    session: AdminSession,
    AppPath(path): AppPath<MonthPath>,
) -> ApiResult<ImportSummary> {
    let summary = state.roster.sync_sheet(&session.tenant.id, &path.month).await?;
    info!("{} synced sheet {} on {}", session.username, path.month, session.tenant.slug);
    ok(summary)
}
