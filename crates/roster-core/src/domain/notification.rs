// ============================================================================
// Roster Core - Employee Notifications
// File: crates/roster-core/src/domain/notification.rs
// Description: Derived notification feed and per-employee read markers
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::modification::ModificationLog;
use super::schedule_request::{RequestKind, RequestLog, RequestStatus, ScheduleRequest};

/// How far back resolved requests and shift changes are reported.
pub const NOTIFICATION_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RequestApproved,
    RequestRejected,
    ShiftModified,
    SwapRequestReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub admin_message: Option<String>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Last time each employee cleared their feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadMarkers {
    #[serde(default)]
    pub last_read: BTreeMap<String, DateTime<Utc>>,
}

impl ReadMarkers {
    pub fn last_read(&self, employee_id: &str) -> Option<DateTime<Utc>> {
        self.last_read
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(employee_id))
            .map(|(_, at)| *at)
    }

    pub fn mark_read(&mut self, employee_id: &str, now: DateTime<Utc>) {
        self.last_read.retain(|id, _| !id.eq_ignore_ascii_case(employee_id));
        self.last_read.insert(employee_id.to_string(), now);
    }
}

fn is_subject(request: &ScheduleRequest, employee_id: &str) -> bool {
    match &request.kind {
        RequestKind::ShiftChange { employee_id: subject, .. } => subject.eq_ignore_ascii_case(employee_id),
        RequestKind::Swap { requester_id, .. } => requester_id.eq_ignore_ascii_case(employee_id),
    }
}

fn label(request: &ScheduleRequest) -> &'static str {
    match request.kind {
        RequestKind::ShiftChange { .. } => "shift change",
        RequestKind::Swap { .. } => "swap",
    }
}

/// Unread events for one employee, newest first:
/// - their own requests resolved within the window;
/// - roster changes to their shifts within the window;
/// - pending swaps that target them.
pub fn collect_notifications(
    requests: &RequestLog,
    modifications: &ModificationLog,
    employee_id: &str,
    last_read: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> NotificationFeed {
    let since = now - Duration::days(NOTIFICATION_WINDOW_DAYS);
    let unread = |at: DateTime<Utc>| last_read.map_or(true, |read| at > read);
    let mut notifications = Vec::new();

    for request in &requests.requests {
        match (request.status, request.resolved_at) {
            (RequestStatus::Approved | RequestStatus::Rejected, Some(resolved_at))
                if is_subject(request, employee_id) && resolved_at > since && unread(resolved_at) =>
            {
                let approved = request.status == RequestStatus::Approved;
                let mut message = format!(
                    "Your {} request for {} {}",
                    label(request),
                    request.date,
                    if approved { "has been approved" } else { "was rejected" }
                );
                if let Some(note) = &request.admin_message {
                    message.push_str(&format!(". Message from admin: {}", note));
                }
                notifications.push(Notification {
                    id: format!("req-{}", request.id),
                    kind: if approved {
                        NotificationKind::RequestApproved
                    } else {
                        NotificationKind::RequestRejected
                    },
                    title: if approved { "Request Approved" } else { "Request Rejected" }.to_string(),
                    message,
                    admin_message: request.admin_message.clone(),
                    date: request.date,
                    timestamp: resolved_at,
                    priority: if approved { Priority::High } else { Priority::Medium },
                });
            }
            (RequestStatus::Pending, _) => {
                if let RequestKind::Swap {
                    requester_name,
                    target_employee_id,
                    ..
                } = &request.kind
                {
                    if target_employee_id.eq_ignore_ascii_case(employee_id) && unread(request.created_at) {
                        notifications.push(Notification {
                            id: format!("swap-target-{}", request.id),
                            kind: NotificationKind::SwapRequestReceived,
                            title: "Swap Request".to_string(),
                            message: format!("{} wants to swap shifts with you on {}", requester_name, request.date),
                            admin_message: None,
                            date: request.date,
                            timestamp: request.created_at,
                            priority: Priority::Medium,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    for record in &modifications.records {
        if record.employee_id.eq_ignore_ascii_case(employee_id) && record.timestamp > since && unread(record.timestamp) {
            notifications.push(Notification {
                id: format!("shift-{}-{}-{}", record.date, record.employee_id, record.timestamp.timestamp_millis()),
                kind: NotificationKind::ShiftModified,
                title: "Shift Updated".to_string(),
                message: format!(
                    "Your shift on {} has been changed from {} to {}",
                    record.date,
                    display_code(&record.old_shift),
                    display_code(&record.new_shift)
                ),
                admin_message: None,
                date: record.date,
                timestamp: record.timestamp,
                priority: Priority::High,
            });
        }
    }

    notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    NotificationFeed {
        unread_count: notifications.len(),
        notifications,
        last_read_at: last_read,
    }
}

fn display_code(code: &str) -> &str {
    if code.is_empty() {
        "unassigned"
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, Modification};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn change(employee: &str) -> RequestKind {
        RequestKind::ShiftChange {
            employee_id: employee.into(),
            employee_name: "Ann".into(),
            current_shift: "M2".into(),
            requested_shift: "DO".into(),
        }
    }

    fn swap(requester: &str, target: &str) -> RequestKind {
        RequestKind::Swap {
            requester_id: requester.into(),
            requester_name: "Ann".into(),
            target_employee_id: target.into(),
            target_employee_name: "Ben".into(),
            requester_shift: "M2".into(),
            target_shift: "D1".into(),
        }
    }

    #[test]
    fn test_feed_covers_resolutions_changes_and_incoming_swaps() {
        let now = Utc::now();
        let mut requests = RequestLog::default();
        let approved = requests.submit(change("E1"), "A", day(), "x", now).id.clone();
        requests
            .find_mut(&approved)
            .unwrap()
            .resolve(Decision::Approved, "boss", Some("ok".into()), now)
            .unwrap();
        requests.submit(swap("E2", "e1"), "A", day(), "y", now);
        requests.submit(change("E2"), "A", day(), "z", now);

        let mut modifications = ModificationLog::default();
        modifications.append([Modification::new("E1", "Ann", "A", day(), "M2", "DO", "boss", now)]);

        let feed = collect_notifications(&requests, &modifications, "E1", None, now + Duration::seconds(1));
        let kinds: Vec<NotificationKind> = feed.notifications.iter().map(|n| n.kind).collect();
        assert_eq!(feed.unread_count, 3);
        assert!(kinds.contains(&NotificationKind::RequestApproved));
        assert!(kinds.contains(&NotificationKind::ShiftModified));
        assert!(kinds.contains(&NotificationKind::SwapRequestReceived));
        assert!(feed.notifications.iter().any(|n| n.message.ends_with("Message from admin: ok")));
    }

    #[test]
    fn test_read_marker_and_window_hide_old_events() {
        let now = Utc::now();
        let old = now - Duration::days(NOTIFICATION_WINDOW_DAYS + 1);
        let mut modifications = ModificationLog::default();
        modifications.append([
            Modification::new("E1", "Ann", "A", day(), "", "M2", "boss", old),
            Modification::new("E1", "Ann", "A", day(), "M2", "M3", "boss", now - Duration::hours(2)),
        ]);
        let requests = RequestLog::default();

        let feed = collect_notifications(&requests, &modifications, "E1", None, now);
        assert_eq!(feed.unread_count, 1);

        let mut markers = ReadMarkers::default();
        markers.mark_read("e1", now - Duration::hours(1));
        let feed = collect_notifications(&requests, &modifications, "E1", markers.last_read("E1"), now);
        assert_eq!(feed.unread_count, 0);
    }
}
