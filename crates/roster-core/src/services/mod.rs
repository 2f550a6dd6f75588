//! Domain services

pub mod locks;
pub mod tenant_service;
pub mod auth_service;
pub mod roster_service;
pub mod request_service;

pub use locks::TenantLocks;
pub use tenant_service::{
    CreateTenant, NewAdmin, PublicTenantInfo, SignupRequest, TenantExport, TenantService, TenantSummary, TenantUpdate,
};
pub use auth_service::{AuthOptions, AuthService, PasswordLinkIssued, SessionGrant};
pub use roster_service::{
    EmployeeSchedule, EmployeeUpdate, NewEmployee, ProfileView, RosterService, ScheduleEntry, ShiftUpdate,
};
pub use request_service::{PendingRequests, RequestService, ShiftChangeInput, SwapInput};
