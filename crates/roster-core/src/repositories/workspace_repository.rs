//! Tenant-scoped document repository trait (port)
//!
//! Every method addresses exactly one tenant's partition. Loads of a
//! document that was never written return its empty default.

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{
    AdminUser, EmployeeCredential, ModificationLog, ProfileBook, ReadMarkers, RequestLog, Roster, WorkspaceSettings,
};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn load_roster(&self, tenant_id: &Uuid) -> Result<Roster, DomainError>;
    async fn save_roster(&self, tenant_id: &Uuid, roster: &Roster) -> Result<(), DomainError>;

    async fn load_requests(&self, tenant_id: &Uuid) -> Result<RequestLog, DomainError>;
    async fn save_requests(&self, tenant_id: &Uuid, requests: &RequestLog) -> Result<(), DomainError>;

    async fn load_modifications(&self, tenant_id: &Uuid) -> Result<ModificationLog, DomainError>;
    async fn save_modifications(&self, tenant_id: &Uuid, log: &ModificationLog) -> Result<(), DomainError>;

    async fn load_settings(&self, tenant_id: &Uuid) -> Result<WorkspaceSettings, DomainError>;
    async fn save_settings(&self, tenant_id: &Uuid, settings: &WorkspaceSettings) -> Result<(), DomainError>;

    async fn load_admins(&self, tenant_id: &Uuid) -> Result<Vec<AdminUser>, DomainError>;
    async fn save_admins(&self, tenant_id: &Uuid, admins: &[AdminUser]) -> Result<(), DomainError>;

    async fn load_credentials(&self, tenant_id: &Uuid) -> Result<Vec<EmployeeCredential>, DomainError>;
    async fn save_credentials(&self, tenant_id: &Uuid, credentials: &[EmployeeCredential]) -> Result<(), DomainError>;

    async fn load_profiles(&self, tenant_id: &Uuid) -> Result<ProfileBook, DomainError>;
    async fn save_profiles(&self, tenant_id: &Uuid, profiles: &ProfileBook) -> Result<(), DomainError>;

    async fn load_read_markers(&self, tenant_id: &Uuid) -> Result<ReadMarkers, DomainError>;
    async fn save_read_markers(&self, tenant_id: &Uuid, markers: &ReadMarkers) -> Result<(), DomainError>;
}
