// ============================================================================
// Roster Core - Schedule Requests
// File: crates/roster-core/src/domain/schedule_request.rs
// Description: Shift-change and swap requests with their resolution state
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// An admin's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestKind {
    ShiftChange {
        employee_id: String,
        employee_name: String,
        current_shift: String,
        requested_shift: String,
    },
    Swap {
        requester_id: String,
        requester_name: String,
        target_employee_id: String,
        target_employee_name: String,
        requester_shift: String,
        target_shift: String,
    },
}

impl RequestKind {
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RequestKind::ShiftChange { .. } => "shift_change",
            RequestKind::Swap { .. } => "swap",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub id: String,
    pub team: String,
    pub date: NaiveDate,
    pub reason: String,
    #[serde(flatten)]
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub admin_message: Option<String>,
}

impl ScheduleRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// True when the employee filed the request or is its swap target.
    pub fn involves(&self, employee_id: &str) -> bool {
        match &self.kind {
            RequestKind::ShiftChange { employee_id: subject, .. } => subject.eq_ignore_ascii_case(employee_id),
            RequestKind::Swap {
                requester_id,
                target_employee_id,
                ..
            } => requester_id.eq_ignore_ascii_case(employee_id) || target_employee_id.eq_ignore_ascii_case(employee_id),
        }
    }

    /// Moves a pending request to its final state. Resolved requests are immutable.
    pub fn resolve(
        &mut self,
        decision: Decision,
        resolved_by: &str,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::RequestAlreadyResolved(self.id.clone()));
        }
        self.status = decision.into();
        self.resolved_at = Some(now);
        self.resolved_by = Some(resolved_by.to_string());
        self.admin_message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub shift_change_total: usize,
    pub swap_total: usize,
}

/// The per-tenant request document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestLog {
    #[serde(default)]
    pub next_sequence: u64,
    #[serde(default)]
    pub requests: Vec<ScheduleRequest>,
}

impl RequestLog {
    /// Appends a new pending request and returns its id.
    pub fn submit(
        &mut self,
        kind: RequestKind,
        team: &str,
        date: NaiveDate,
        reason: &str,
        now: DateTime<Utc>,
    ) -> &ScheduleRequest {
        self.next_sequence += 1;
        let id = format!("{}_{}", kind.id_prefix(), self.next_sequence);
        self.requests.push(ScheduleRequest {
            id,
            team: team.to_string(),
            date,
            reason: reason.trim().to_string(),
            kind,
            status: RequestStatus::Pending,
            created_at: now,
            resolved_at: None,
            resolved_by: None,
            admin_message: None,
        });
        let index = self.requests.len() - 1;
        &self.requests[index]
    }

    pub fn find(&self, id: &str) -> Option<&ScheduleRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ScheduleRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Pending first; newest first within each group.
    pub fn sorted(&self) -> Vec<ScheduleRequest> {
        let mut all = self.requests.clone();
        all.sort_by(|a, b| {
            b.is_pending()
                .cmp(&a.is_pending())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        all
    }

    pub fn pending(&self) -> Vec<ScheduleRequest> {
        self.sorted().into_iter().filter(ScheduleRequest::is_pending).collect()
    }

    pub fn for_employee(&self, employee_id: &str) -> Vec<ScheduleRequest> {
        self.sorted().into_iter().filter(|r| r.involves(employee_id)).collect()
    }

    pub fn stats(&self) -> RequestStats {
        let mut stats = RequestStats::default();
        for request in &self.requests {
            match request.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
            match request.kind {
                RequestKind::ShiftChange { .. } => stats.shift_change_total += 1,
                RequestKind::Swap { .. } => stats.swap_total += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn change(employee: &str) -> RequestKind {
        RequestKind::ShiftChange {
            employee_id: employee.into(),
            employee_name: "Alice".into(),
            current_shift: "M2".into(),
            requested_shift: "DO".into(),
        }
    }

    fn swap(requester: &str, target: &str) -> RequestKind {
        RequestKind::Swap {
            requester_id: requester.into(),
            requester_name: "Alice".into(),
            target_employee_id: target.into(),
            target_employee_name: "Bob".into(),
            requester_shift: "M2".into(),
            target_shift: "D1".into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_ids_follow_sequence() {
        let mut log = RequestLog::default();
        let now = Utc::now();
        assert_eq!(log.submit(change("E1"), "A", date(), "sick", now).id, "shift_change_1");
        assert_eq!(log.submit(swap("E1", "E2"), "A", date(), "trip", now).id, "swap_2");
    }

    #[test]
    fn test_resolve_exactly_once() {
        let mut log = RequestLog::default();
        let id = log.submit(change("E1"), "A", date(), "sick", Utc::now()).id.clone();
        let request = log.find_mut(&id).unwrap();
        request.resolve(Decision::Approved, "admin", Some(" ok ".into()), Utc::now()).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.admin_message.as_deref(), Some("ok"));

        let again = request.resolve(Decision::Rejected, "admin", None, Utc::now());
        assert!(matches!(again, Err(DomainError::RequestAlreadyResolved(_))));
        assert_eq!(request.status, RequestStatus::Approved);
    }

    #[test]
    fn test_sorted_pending_first_newest_first() {
        let mut log = RequestLog::default();
        let t0 = Utc::now();
        log.submit(change("E1"), "A", date(), "a", t0);
        log.submit(change("E1"), "A", date(), "b", t0 + Duration::minutes(1));
        log.submit(change("E1"), "A", date(), "c", t0 + Duration::minutes(2));
        log.find_mut("shift_change_3")
            .unwrap()
            .resolve(Decision::Rejected, "admin", None, t0)
            .unwrap();

        let ids: Vec<String> = log.sorted().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["shift_change_2", "shift_change_1", "shift_change_3"]);
        assert_eq!(log.pending().len(), 2);
    }

    #[test]
    fn test_involves_and_stats() {
        let mut log = RequestLog::default();
        log.submit(change("E1"), "A", date(), "a", Utc::now());
        log.submit(swap("E2", "E3"), "A", date(), "b", Utc::now());

        assert_eq!(log.for_employee("e3").len(), 1);
        assert_eq!(log.for_employee("E1").len(), 1);
        let stats = log.stats();
        assert_eq!((stats.pending, stats.shift_change_total, stats.swap_total), (2, 1, 1));
    }

    #[test]
    fn test_document_shape() {
        let mut log = RequestLog::default();
        log.submit(swap("E1", "E2"), "A", date(), "trip", Utc::now());
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["requests"][0]["type"], "swap");
        assert_eq!(json["requests"][0]["target_employee_id"], "E2");

        let back: RequestLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
