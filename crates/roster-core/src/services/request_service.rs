// ============================================================================
// Roster Core - Request Workflow
// File: crates/roster-core/src/services/request_service.rs
// ============================================================================
//! Shift-change and swap requests: submission, listing and resolution

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    collect_notifications, Decision, Modification, ModificationLog, NotificationFeed, RequestKind, RequestStats, Roster,
    ScheduleRequest,
};
use crate::error::DomainError;
use crate::repositories::WorkspaceRepository;
use crate::services::locks::TenantLocks;

#[derive(Debug, Clone, Deserialize)]
pub struct ShiftChangeInput {
    pub date: NaiveDate,
    pub requested_shift: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapInput {
    pub target_employee_id: String,
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingRequests {
    pub requests: Vec<ScheduleRequest>,
    pub stats: RequestStats,
}

pub struct RequestService {
    workspace: Arc<dyn WorkspaceRepository>,
    locks: Arc<TenantLocks>,
}

impl RequestService {
    pub fn new(workspace: Arc<dyn WorkspaceRepository>, locks: Arc<TenantLocks>) -> Self {
        Self { workspace, locks }
    }

    pub async fn submit_shift_change(
        &self,
        tenant_id: &Uuid,
        employee_id: &str,
        input: ShiftChangeInput,
    ) -> Result<ScheduleRequest, DomainError> {
        let reason = required_reason(&input.reason)?;
        let settings = self.workspace.load_settings(tenant_id).await?;
        let requested = settings.validate_shift(&input.requested_shift)?;
        if requested.is_empty() {
            return Err(DomainError::ValidationError("Requested shift is required".into()));
        }

        let _guard = self.locks.acquire(tenant_id).await;
        let roster = self.workspace.load_roster(tenant_id).await?;
        let employee = roster
            .employee(employee_id)
            .filter(|e| e.is_active())
            .ok_or_else(|| DomainError::EmployeeNotActive(employee_id.to_string()))?;
        let current = roster.shift_on(&employee.id, input.date)?.to_string();
        if current == requested {
            return Err(DomainError::ValidationError(format!(
                "Shift on {} is already {}",
                input.date, requested
            )));
        }

        let kind = RequestKind::ShiftChange {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            current_shift: current,
            requested_shift: requested,
        };
        let mut log = self.workspace.load_requests(tenant_id).await?;
        let request = log.submit(kind, &employee.team, input.date, reason, Utc::now()).clone();
        self.workspace.save_requests(tenant_id, &log).await?;
        info!("Request {} submitted by {}", request.id, employee.id);
        Ok(request)
    }

    pub async fn submit_swap(
        &self,
        tenant_id: &Uuid,
        requester_id: &str,
        input: SwapInput,
    ) -> Result<ScheduleRequest, DomainError> {
        let reason = required_reason(&input.reason)?;
        if input.target_employee_id.trim().eq_ignore_ascii_case(requester_id.trim()) {
            return Err(DomainError::ValidationError("Cannot swap with yourself".into()));
        }

        let _guard = self.locks.acquire(tenant_id).await;
        let roster = self.workspace.load_roster(tenant_id).await?;
        let requester = roster
            .employee(requester_id)
            .filter(|e| e.is_active())
            .ok_or_else(|| DomainError::EmployeeNotActive(requester_id.to_string()))?;
        let target = roster
            .employee(&input.target_employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(input.target_employee_id.clone()))?;
        if !target.is_active() {
            return Err(DomainError::EmployeeNotActive(target.id.clone()));
        }

        let kind = RequestKind::Swap {
            requester_id: requester.id.clone(),
            requester_name: requester.name.clone(),
            target_employee_id: target.id.clone(),
            target_employee_name: target.name.clone(),
            requester_shift: roster.shift_on(&requester.id, input.date)?.to_string(),
            target_shift: roster.shift_on(&target.id, input.date)?.to_string(),
        };
        let mut log = self.workspace.load_requests(tenant_id).await?;
        let request = log.submit(kind, &requester.team, input.date, reason, Utc::now()).clone();
        self.workspace.save_requests(tenant_id, &log).await?;
        info!("Swap {} submitted: {} <-> {}", request.id, requester.id, target.id);
        Ok(request)
    }

    /// Pending first, newest first.
    pub async fn list(&self, tenant_id: &Uuid) -> Result<Vec<ScheduleRequest>, DomainError> {
        Ok(self.workspace.load_requests(tenant_id).await?.sorted())
    }

    pub async fn pending(&self, tenant_id: &Uuid) -> Result<PendingRequests, DomainError> {
        let log = self.workspace.load_requests(tenant_id).await?;
        Ok(PendingRequests {
            requests: log.pending(),
            stats: log.stats(),
        })
    }

    pub async fn for_employee(&self, tenant_id: &Uuid, employee_id: &str) -> Result<Vec<ScheduleRequest>, DomainError> {
        Ok(self.workspace.load_requests(tenant_id).await?.for_employee(employee_id))
    }

    /// Resolves a pending request exactly once. Approval applies the
    /// roster change and audit records; if any of the three writes fails the
    /// earlier ones are restored and the request stays pending.
    pub async fn resolve(
        &self,
        tenant_id: &Uuid,
        request_id: &str,
        decision: Decision,
        admin: &str,
        message: Option<String>,
    ) -> Result<ScheduleRequest, DomainError> {
        let workspace = self.workspace.clone();
        let locks = self.locks.clone();
        let tenant_id = *tenant_id;
        let request_id = request_id.to_string();
        let admin = admin.to_string();

        // Spawned so a dropped caller (request timeout) cannot stop it between writes.
        tokio::spawn(async move {
            let _guard = locks.acquire(&tenant_id).await;
            resolve_locked(workspace.as_ref(), &tenant_id, &request_id, decision, &admin, message).await
        })
        .await
        .map_err(|e| DomainError::InternalError(format!("Request resolution aborted: {}", e)))?
    }

    /// Unread feed for one employee.
    pub async fn notifications(&self, tenant_id: &Uuid, employee_id: &str) -> Result<NotificationFeed, DomainError> {
        let requests = self.workspace.load_requests(tenant_id).await?;
        let modifications = self.workspace.load_modifications(tenant_id).await?;
        let last_read = self.workspace.load_read_markers(tenant_id).await?.last_read(employee_id);
        Ok(collect_notifications(&requests, &modifications, employee_id, last_read, Utc::now()))
    }

    /// Marks everything up to now as read for the employee.
    pub async fn mark_notifications_read(&self, tenant_id: &Uuid, employee_id: &str) -> Result<DateTime<Utc>, DomainError> {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut markers = self.workspace.load_read_markers(tenant_id).await?;
        let now = Utc::now();
        markers.mark_read(employee_id, now);
        self.workspace.save_read_markers(tenant_id, &markers).await?;
        Ok(now)
    }
}

async fn resolve_locked(
    workspace: &dyn WorkspaceRepository,
    tenant_id: &Uuid,
    request_id: &str,
    decision: Decision,
    admin: &str,
    message: Option<String>,
) -> Result<ScheduleRequest, DomainError> {
    let mut log = workspace.load_requests(tenant_id).await?;
    let request = log
        .find_mut(request_id)
        .ok_or_else(|| DomainError::RequestNotFound(request_id.to_string()))?;
    if !request.is_pending() {
        return Err(DomainError::RequestAlreadyResolved(request.id.clone()));
    }

    let now = Utc::now();
    let mut change = None;
    if decision == Decision::Approved {
        let original = workspace.load_roster(tenant_id).await?;
        let mut roster = original.clone();
        let records = apply_request(&mut roster, request, admin, now)?;
        if !records.is_empty() {
            let original_log = workspace.load_modifications(tenant_id).await?;
            let mut modifications = original_log.clone();
            modifications.append(records);
            change = Some((roster, modifications, original, original_log));
        }
    }
    request.resolve(decision, admin, message, now)?;
    let resolved = request.clone();

    if let Some((roster, modifications, original, original_log)) = &change {
        workspace.save_roster(tenant_id, roster).await?;
        if let Err(e) = workspace.save_modifications(tenant_id, modifications).await {
            roll_back(workspace, tenant_id, original, None).await;
            return Err(e);
        }
        if let Err(e) = workspace.save_requests(tenant_id, &log).await {
            roll_back(workspace, tenant_id, original, Some(original_log)).await;
            return Err(e);
        }
    } else {
        workspace.save_requests(tenant_id, &log).await?;
    }

    info!("Request {} {:?} by {}", resolved.id, resolved.status, admin);
    Ok(resolved)
}

/// Restores documents written by a half-finished approval.
async fn roll_back(
    workspace: &dyn WorkspaceRepository,
    tenant_id: &Uuid,
    roster: &Roster,
    modifications: Option<&ModificationLog>,
) {
    warn!("Rolling back partial request approval for tenant {}", tenant_id);
    if let Err(e) = workspace.save_roster(tenant_id, roster).await {
        error!("Roster rollback failed for tenant {}: {}", tenant_id, e);
    }
    if let Some(modifications) = modifications {
        if let Err(e) = workspace.save_modifications(tenant_id, modifications).await {
            error!("Modification log rollback failed for tenant {}: {}", tenant_id, e);
        }
    }
}

fn required_reason(raw: &str) -> Result<&str, DomainError> {
    let reason = raw.trim();
    if reason.is_empty() {
        return Err(DomainError::ValidationError("Reason is required".into()));
    }
    if reason.len() > 1000 {
        return Err(DomainError::ValidationError("Reason too long".into()));
    }
    Ok(reason)
}

/// Applies an approved request to the roster and returns one audit record
/// per changed cell. The roster is untouched on error.
fn apply_request(
    roster: &mut Roster,
    request: &ScheduleRequest,
    admin: &str,
    now: chrono::DateTime<Utc>,
) -> Result<Vec<Modification>, DomainError> {
    let date = request.date;
    let mut updated = roster.clone();
    let mut changes = Vec::new();

    match &request.kind {
        RequestKind::ShiftChange {
            employee_id,
            requested_shift,
            ..
        } => {
            if let Some(change) = updated.set_shift(employee_id, date, requested_shift)? {
                changes.push((employee_id.clone(), change));
            }
        }
        RequestKind::Swap {
            requester_id,
            target_employee_id,
            ..
        } => {
            let requester_shift = updated.shift_on(requester_id, date)?.to_string();
            let target_shift = updated.shift_on(target_employee_id, date)?.to_string();
            if let Some(change) = updated.set_shift(requester_id, date, &target_shift)? {
                changes.push((requester_id.clone(), change));
            }
            if let Some(change) = updated.set_shift(target_employee_id, date, &requester_shift)? {
                changes.push((target_employee_id.clone(), change));
            }
        }
    }

    let mut records = Vec::with_capacity(changes.len());
    for (employee_id, change) in changes {
        let employee = updated
            .employee(&employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.clone()))?;
        records.push(Modification::new(
            &employee.id,
            &employee.name,
            &employee.team,
            date,
            &change.old_shift,
            &change.new_shift,
            admin,
            now,
        ));
    }
    if records.is_empty() {
        warn!("Request {} approved without roster change", request.id);
    }
    *roster = updated;
    Ok(records)
}
