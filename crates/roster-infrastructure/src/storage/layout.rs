//! On-disk layout of the data directory

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// The documents kept in each tenant's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantDocument {
    Roster,
    Requests,
    Modifications,
    Settings,
    Admins,
    Credentials,
    Profiles,
    ReadMarkers,
}

impl TenantDocument {
    pub fn file_name(&self) -> &'static str {
        match self {
            TenantDocument::Roster => "roster.json",
            TenantDocument::Requests => "schedule_requests.json",
            TenantDocument::Modifications => "modified_shifts.json",
            TenantDocument::Settings => "settings.json",
            TenantDocument::Admins => "admin_users.json",
            TenantDocument::Credentials => "employee_credentials.json",
            TenantDocument::Profiles => "employee_profiles.json",
            TenantDocument::ReadMarkers => "read_notifications.json",
        }
    }
}

/// ```text
/// <root>/tenants.json
/// <root>/developers.json
/// <root>/tenants/<tenant-id>/<document>.json
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tenants_file(&self) -> PathBuf {
        self.root.join("tenants.json")
    }

    pub fn developers_file(&self) -> PathBuf {
        self.root.join("developers.json")
    }

    pub fn tenant_dir(&self, tenant_id: &Uuid) -> PathBuf {
        self.root.join("tenants").join(tenant_id.to_string())
    }

    pub fn tenant_file(&self, tenant_id: &Uuid, document: TenantDocument) -> PathBuf {
        self.tenant_dir(tenant_id).join(document.file_name())
    }
}
