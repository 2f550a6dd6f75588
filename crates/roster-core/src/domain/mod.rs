//! # Roster Core - Domain Module
//!
//! Domain entities for the roster service.

pub mod tenant;
pub mod employee;
pub mod roster;
pub mod schedule_request;
pub mod modification;
pub mod credential;
pub mod settings;
pub mod profile;
pub mod notification;

// Re-export all entities and enums
pub use tenant::{Tenant, TenantSettings, Subscription, SubscriptionPlan, SubscriptionStatus};
pub use employee::{Employee, EmployeeStatus};
pub use roster::{Roster, ShiftChange};
pub use schedule_request::{Decision, RequestKind, RequestLog, RequestStats, RequestStatus, ScheduleRequest};
pub use modification::{Modification, ModificationLog, ModificationOverview, MonthlyStats};
pub use credential::{
    find_credential, find_credential_mut, AdminProfile, AdminRole, AdminUser, CredentialStatus, DeveloperUser,
    EmployeeCredential,
};
pub use settings::{normalize_shift_code, WorkspaceSettings};
pub use profile::{EmployeeProfile, Gender, ProfileBook};
pub use notification::{collect_notifications, Notification, NotificationFeed, NotificationKind, Priority, ReadMarkers};
