// ============================================================================
// Roster Infrastructure - JSON File Store
// File: crates/roster-infrastructure/src/storage/json_store.rs
// ============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use roster_core::domain::{
    AdminUser, DeveloperUser, EmployeeCredential, ModificationLog, ProfileBook, ReadMarkers, RequestLog, Roster, Tenant,
    WorkspaceSettings,
};
use roster_core::error::DomainError;
use roster_core::repositories::{DeveloperRepository, TenantRepository, WorkspaceRepository};

use super::layout::{DataLayout, TenantDocument};

/// Stores every document as a pretty-printed JSON file. Writes land in a
/// temporary sibling first and are renamed into place.
///
/// Global files (tenants, developers) are guarded here; tenant documents
/// are serialised by the caller's per-tenant lock.
pub struct JsonFileStore {
    layout: DataLayout,
    registry: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            registry: Mutex::new(()),
        }
    }

    /// Creates the data directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let layout = DataLayout::new(root);
        fs::create_dir_all(layout.root())
            .await
            .map_err(|e| storage_error(layout.root(), e))?;
        info!("Data directory: {}", layout.root().display());
        Ok(Self::new(layout))
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    async fn load_doc<T>(&self, tenant_id: &Uuid, document: TenantDocument) -> Result<T, DomainError>
    where
        T: DeserializeOwned + Default,
    {
        read_json(&self.layout.tenant_file(tenant_id, document)).await
    }

    async fn save_doc<T>(&self, tenant_id: &Uuid, document: TenantDocument, value: &T) -> Result<(), DomainError>
    where
        T: Serialize + ?Sized + Sync,
    {
        write_json(&self.layout.tenant_file(tenant_id, document), value).await
    }
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> DomainError {
    error!("Storage failure on {}: {}", path.display(), e);
    DomainError::StorageError(format!("{}: {}", path.display(), e))
}

/// Missing or blank files read as the empty document.
async fn read_json<T>(path: &Path) -> Result<T, DomainError>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| storage_error(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage_error(path, e)),
    }
}

async fn write_json<T>(path: &Path, value: &T) -> Result<(), DomainError>
where
    T: Serialize + ?Sized + Sync,
{
    let parent = path
        .parent()
        .ok_or_else(|| storage_error(path, "no parent directory"))?;
    fs::create_dir_all(parent).await.map_err(|e| storage_error(parent, e))?;

    let bytes = serde_json::to_vec_pretty(value).map_err(|e| storage_error(path, e))?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("document");
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let mut file = fs::File::create(&tmp).await.map_err(|e| storage_error(&tmp, e))?;
    file.write_all(&bytes).await.map_err(|e| storage_error(&tmp, e))?;
    file.sync_all().await.map_err(|e| storage_error(&tmp, e))?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(storage_error(path, e));
    }
    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[async_trait]
impl TenantRepository for JsonFileStore {
    async fn list(&self) -> Result<Vec<Tenant>, DomainError> {
        read_json(&self.layout.tenants_file()).await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self.list().await?.into_iter().find(|t| t.id == *id))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self.list().await?.into_iter().find(|t| t.slug == slug))
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let _guard = self.registry.lock().await;
        let path = self.layout.tenants_file();
        let mut tenants: Vec<Tenant> = read_json(&path).await?;
        if tenants.iter().any(|t| t.slug == tenant.slug) {
            return Err(DomainError::TenantSlugAlreadyExists(tenant.slug.clone()));
        }
        tenants.push(tenant.clone());
        write_json(&path, &tenants).await?;
        fs::create_dir_all(self.layout.tenant_dir(&tenant.id))
            .await
            .map_err(|e| storage_error(&self.layout.tenant_dir(&tenant.id), e))?;
        Ok(tenant.clone())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let _guard = self.registry.lock().await;
        let path = self.layout.tenants_file();
        let mut tenants: Vec<Tenant> = read_json(&path).await?;
        if tenants.iter().any(|t| t.slug == tenant.slug && t.id != tenant.id) {
            return Err(DomainError::TenantSlugAlreadyExists(tenant.slug.clone()));
        }
        let slot = tenants
            .iter_mut()
            .find(|t| t.id == tenant.id)
            .ok_or(DomainError::TenantNotFound)?;
        *slot = tenant.clone();
        write_json(&path, &tenants).await?;
        Ok(tenant.clone())
    }
}

#[async_trait]
impl DeveloperRepository for JsonFileStore {
    async fn count(&self) -> Result<usize, DomainError> {
        let developers: Vec<DeveloperUser> = read_json(&self.layout.developers_file()).await?;
        Ok(developers.len())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<DeveloperUser>, DomainError> {
        let developers: Vec<DeveloperUser> = read_json(&self.layout.developers_file()).await?;
        Ok(developers.into_iter().find(|d| d.username.eq_ignore_ascii_case(username)))
    }

    async fn create(&self, developer: &DeveloperUser) -> Result<DeveloperUser, DomainError> {
        let _guard = self.registry.lock().await;
        let path = self.layout.developers_file();
        let mut developers: Vec<DeveloperUser> = read_json(&path).await?;
        if developers.iter().any(|d| d.username.eq_ignore_ascii_case(&developer.username)) {
            return Err(DomainError::UserAlreadyExists(developer.username.clone()));
        }
        developers.push(developer.clone());
        write_json(&path, &developers).await?;
        Ok(developer.clone())
    }
}

#[async_trait]
impl WorkspaceRepository for JsonFileStore {
    async fn load_roster(&self, tenant_id: &Uuid) -> Result<Roster, DomainError> {
        let mut roster: Roster = self.load_doc(tenant_id, TenantDocument::Roster).await?;
        roster.normalize();
        Ok(roster)
    }

    async fn save_roster(&self, tenant_id: &Uuid, roster: &Roster) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Roster, roster).await
    }

    async fn load_requests(&self, tenant_id: &Uuid) -> Result<RequestLog, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Requests).await
    }

    async fn save_requests(&self, tenant_id: &Uuid, requests: &RequestLog) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Requests, requests).await
    }

    async fn load_modifications(&self, tenant_id: &Uuid) -> Result<ModificationLog, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Modifications).await
    }

    async fn save_modifications(&self, tenant_id: &Uuid, log: &ModificationLog) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Modifications, log).await
    }

    async fn load_settings(&self, tenant_id: &Uuid) -> Result<WorkspaceSettings, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Settings).await
    }

    async fn save_settings(&self, tenant_id: &Uuid, settings: &WorkspaceSettings) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Settings, settings).await
    }

    async fn load_admins(&self, tenant_id: &Uuid) -> Result<Vec<AdminUser>, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Admins).await
    }

    async fn save_admins(&self, tenant_id: &Uuid, admins: &[AdminUser]) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Admins, admins).await
    }

    async fn load_credentials(&self, tenant_id: &Uuid) -> Result<Vec<EmployeeCredential>, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Credentials).await
    }

    async fn save_credentials(&self, tenant_id: &Uuid, credentials: &[EmployeeCredential]) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Credentials, credentials).await
    }

    async fn load_profiles(&self, tenant_id: &Uuid) -> Result<ProfileBook, DomainError> {
        self.load_doc(tenant_id, TenantDocument::Profiles).await
    }

    async fn save_profiles(&self, tenant_id: &Uuid, profiles: &ProfileBook) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::Profiles, profiles).await
    }

    async fn load_read_markers(&self, tenant_id: &Uuid) -> Result<ReadMarkers, DomainError> {
        self.load_doc(tenant_id, TenantDocument::ReadMarkers).await
    }

    async fn save_read_markers(&self, tenant_id: &Uuid, markers: &ReadMarkers) -> Result<(), DomainError> {
        self.save_doc(tenant_id, TenantDocument::ReadMarkers, markers).await
    }
}
