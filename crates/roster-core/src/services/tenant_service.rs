// ============================================================================
// Roster Core - Tenant Service
// File: crates/roster-core/src/services/tenant_service.rs
// ============================================================================
//! Developer-portal tenant administration and public signup

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use roster_security::PasswordService;
use roster_shared::utils::normalize_slug;

use crate::domain::{
    AdminProfile, AdminRole, AdminUser, Employee, ModificationLog, ProfileBook, RequestLog, Roster, SubscriptionPlan,
    Tenant, TenantSettings, WorkspaceSettings,
};
use crate::error::DomainError;
use crate::repositories::{TenantRepository, WorkspaceRepository};
use crate::services::locks::TenantLocks;

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
    pub organization_name: Option<String>,
    pub max_employees: Option<u32>,
    pub admin: Option<NewAdmin>,
}

#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub organization_name: Option<String>,
    pub max_employees: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub name: String,
    pub slug: String,
    pub plan: SubscriptionPlan,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub admin: Option<NewAdmin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantSummary {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub admin_count: usize,
    pub employee_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicTenantInfo {
    pub name: String,
    pub slug: String,
    pub organization_name: Option<String>,
    pub is_active: bool,
}

impl From<&Tenant> for PublicTenantInfo {
    fn from(tenant: &Tenant) -> Self {
        Self {
            name: tenant.name.clone(),
            slug: tenant.slug.clone(),
            organization_name: tenant.settings.organization_name.clone(),
            is_active: tenant.is_active,
        }
    }
}

/// Everything a tenant owns, minus secrets.
#[derive(Debug, Clone, Serialize)]
pub struct TenantExport {
    pub tenant: Tenant,
    pub roster: Roster,
    pub requests: RequestLog,
    pub modifications: ModificationLog,
    pub settings: WorkspaceSettings,
    pub profiles: ProfileBook,
    pub admins: Vec<AdminProfile>,
    pub employee_credentials: usize,
    pub exported_at: DateTime<Utc>,
}

pub struct TenantService {
    tenants: Arc<dyn TenantRepository>,
    workspace: Arc<dyn WorkspaceRepository>,
    locks: Arc<TenantLocks>,
    /// Serialises read-modify-write cycles on tenant records.
    registry: Mutex<()>,
}

impl TenantService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        workspace: Arc<dyn WorkspaceRepository>,
        locks: Arc<TenantLocks>,
    ) -> Self {
        Self {
            tenants,
            workspace,
            locks,
            registry: Mutex::new(()),
        }
    }

    /// Maps a resolved slug to an active tenant.
    pub async fn resolve(&self, slug: &str) -> Result<Tenant, DomainError> {
        match self.tenants.find_by_slug(slug).await? {
            Some(tenant) if tenant.is_active => Ok(tenant),
            _ => Err(DomainError::TenantNotFound),
        }
    }

    pub async fn get(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        self.tenants.find_by_id(id).await?.ok_or(DomainError::TenantNotFound)
    }

    pub async fn public_info(&self, slug: &str) -> Result<PublicTenantInfo, DomainError> {
        let tenant = self
            .tenants
            .find_by_slug(&normalize_slug(slug))
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        Ok(PublicTenantInfo::from(&tenant))
    }

    pub async fn list_with_stats(&self) -> Result<Vec<TenantSummary>, DomainError> {
        let tenants = self.tenants.list().await?;
        let mut summaries = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            let admin_count = self.workspace.load_admins(&tenant.id).await?.len();
            let employee_count = self.workspace.load_roster(&tenant.id).await?.active_employee_count();
            summaries.push(TenantSummary {
                tenant,
                admin_count,
                employee_count,
            });
        }
        Ok(summaries)
    }

    pub async fn create(&self, request: CreateTenant) -> Result<Tenant, DomainError> {
        let settings = TenantSettings {
            organization_name: request.organization_name.or_else(|| Some(request.name.trim().to_string())),
            max_employees: request.max_employees,
        };
        let tenant = Tenant::new(&request.name, &request.slug, settings)?;
        let admin = request.admin.map(build_admin).transpose()?;

        let created = self.tenants.create(&tenant).await?;
        if let Some(admin) = admin {
            self.workspace.save_admins(&created.id, &[admin]).await?;
        }
        info!("Tenant created: {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<Tenant, DomainError> {
        let tenant = Tenant::signup(
            &request.name,
            &request.slug,
            request.plan,
            request.contact_email,
            request.contact_phone,
        )?;
        let admin = request.admin.map(build_admin).transpose()?;

        let created = self.tenants.create(&tenant).await?;
        if let Some(admin) = admin {
            self.workspace.save_admins(&created.id, &[admin]).await?;
        }
        info!("Tenant signup pending activation: {} ({})", created.slug, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &Uuid, update: TenantUpdate) -> Result<Tenant, DomainError> {
        let _registry = self.registry.lock().await;
        let mut tenant = self.get(id).await?;

        if let Some(slug) = update.slug {
            let slug = normalize_slug(&slug);
            if slug != tenant.slug {
                if let Some(other) = self.tenants.find_by_slug(&slug).await? {
                    if other.id != tenant.id {
                        return Err(DomainError::TenantSlugAlreadyExists(slug));
                    }
                }
                tenant.slug = slug;
            }
        }
        if let Some(name) = update.name {
            tenant.name = name.trim().to_string();
        }
        if let Some(active) = update.is_active {
            tenant.is_active = active;
        }
        if let Some(organization_name) = update.organization_name {
            let organization_name = organization_name.trim().to_string();
            tenant.settings.organization_name = (!organization_name.is_empty()).then_some(organization_name);
        }
        if update.max_employees.is_some() {
            tenant.settings.max_employees = update.max_employees;
        }
        tenant.updated_at = Some(Utc::now());
        tenant.check()?;

        self.tenants.update(&tenant).await
    }

    /// Starts the subscription period and opens the tenant for logins.
    pub async fn activate(&self, id: &Uuid, plan: Option<SubscriptionPlan>) -> Result<Tenant, DomainError> {
        let _registry = self.registry.lock().await;
        let mut tenant = self.get(id).await?;
        let now = Utc::now();
        if let Some(plan) = plan {
            tenant.set_plan(plan, now);
        }
        tenant.activate(now);
        let tenant = self.tenants.update(&tenant).await?;
        info!("Tenant activated: {}", tenant.slug);
        Ok(tenant)
    }

    pub async fn set_subscription(&self, id: &Uuid, plan: SubscriptionPlan) -> Result<Tenant, DomainError> {
        let _registry = self.registry.lock().await;
        let mut tenant = self.get(id).await?;
        tenant.set_plan(plan, Utc::now());
        self.tenants.update(&tenant).await
    }

    pub async fn deactivate(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        let _registry = self.registry.lock().await;
        let mut tenant = self.get(id).await?;
        tenant.deactivate(Utc::now());
        let tenant = self.tenants.update(&tenant).await?;
        warn!("Tenant deactivated: {}", tenant.slug);
        Ok(tenant)
    }

    /// The name shown on the tenant's roster pages.
    pub async fn organization_name(&self, id: &Uuid) -> Result<String, DomainError> {
        Ok(self.get(id).await?.display_name().to_string())
    }

    pub async fn set_organization_name(&self, id: &Uuid, name: &str) -> Result<String, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("Organization name is required".into()));
        }
        let _registry = self.registry.lock().await;
        let mut tenant = self.get(id).await?;
        tenant.settings.organization_name = Some(name.to_string());
        tenant.updated_at = Some(Utc::now());
        tenant.check()?;
        let tenant = self.tenants.update(&tenant).await?;
        info!("Organization name of {} set to '{}'", tenant.slug, name);
        Ok(tenant.display_name().to_string())
    }

    pub async fn list_admins(&self, id: &Uuid) -> Result<Vec<AdminProfile>, DomainError> {
        let tenant = self.get(id).await?;
        let admins = self.workspace.load_admins(&tenant.id).await?;
        Ok(admins.iter().map(AdminUser::profile).collect())
    }

    pub async fn add_admin(&self, id: &Uuid, admin: NewAdmin) -> Result<AdminProfile, DomainError> {
        let tenant = self.get(id).await?;
        let admin = build_admin(admin)?;

        let _guard = self.locks.acquire(&tenant.id).await;
        let mut admins = self.workspace.load_admins(&tenant.id).await?;
        if admins.iter().any(|a| a.username.eq_ignore_ascii_case(&admin.username)) {
            return Err(DomainError::UserAlreadyExists(admin.username));
        }
        let profile = admin.profile();
        admins.push(admin);
        self.workspace.save_admins(&tenant.id, &admins).await?;
        info!("Admin {} added to tenant {}", profile.username, tenant.slug);
        Ok(profile)
    }

    pub async fn list_employees(&self, id: &Uuid) -> Result<Vec<Employee>, DomainError> {
        let tenant = self.get(id).await?;
        Ok(self.workspace.load_roster(&tenant.id).await?.employees)
    }

    pub async fn export(&self, id: &Uuid) -> Result<TenantExport, DomainError> {
        let tenant = self.get(id).await?;
        let admins = self.workspace.load_admins(&tenant.id).await?;
        Ok(TenantExport {
            roster: self.workspace.load_roster(&tenant.id).await?,
            requests: self.workspace.load_requests(&tenant.id).await?,
            modifications: self.workspace.load_modifications(&tenant.id).await?,
            settings: self.workspace.load_settings(&tenant.id).await?,
            profiles: self.workspace.load_profiles(&tenant.id).await?,
            admins: admins.iter().map(AdminUser::profile).collect(),
            employee_credentials: self.workspace.load_credentials(&tenant.id).await?.len(),
            exported_at: Utc::now(),
            tenant,
        })
    }

    /// Clears roster, requests and the modification log. Accounts and
    /// settings survive.
    pub async fn reset(&self, id: &Uuid) -> Result<(), DomainError> {
        let tenant = self.get(id).await?;
        let _guard = self.locks.acquire(&tenant.id).await;
        self.workspace.save_roster(&tenant.id, &Roster::default()).await?;
        self.workspace.save_requests(&tenant.id, &RequestLog::default()).await?;
        self.workspace.save_modifications(&tenant.id, &ModificationLog::default()).await?;
        warn!("Tenant data reset: {}", tenant.slug);
        Ok(())
    }
}

fn build_admin(admin: NewAdmin) -> Result<AdminUser, DomainError> {
    let username = admin.username.trim().to_string();
    if username.len() < 3 || username.len() > 50 {
        return Err(DomainError::ValidationError("Username must be between 3 and 50 characters".into()));
    }
    PasswordService::check_strength(&admin.password, &[username.as_str(), admin.full_name.as_str()])?;
    let password_hash = PasswordService::hash(&admin.password)?;
    Ok(AdminUser {
        full_name: if admin.full_name.trim().is_empty() { username.clone() } else { admin.full_name.trim().to_string() },
        username,
        password_hash,
        role: AdminRole::Admin,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockTenantRepository, MockWorkspaceRepository};

    fn service(tenants: MockTenantRepository, workspace: MockWorkspaceRepository) -> TenantService {
        TenantService::new(Arc::new(tenants), Arc::new(workspace), Arc::new(TenantLocks::new()))
    }

    fn acme(active: bool) -> Tenant {
        let mut tenant = Tenant::new("Acme", "acme", TenantSettings::default()).unwrap();
        tenant.is_active = active;
        tenant
    }

    #[tokio::test]
    async fn test_resolve_requires_active_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants
            .expect_find_by_slug()
            .returning(|slug| Ok((slug == "acme").then(|| acme(false))));
        let service = service(tenants, MockWorkspaceRepository::new());

        assert!(matches!(service.resolve("acme").await, Err(DomainError::TenantNotFound)));
        assert!(matches!(service.resolve("other").await, Err(DomainError::TenantNotFound)));
    }

    #[tokio::test]
    async fn test_create_with_admin_saves_hashed_admin() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_create().times(1).returning(|t| Ok(t.clone()));
        let mut workspace = MockWorkspaceRepository::new();
        workspace
            .expect_save_admins()
            .withf(|_, admins| admins.len() == 1 && admins[0].password_hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));

        let tenant = service(tenants, workspace)
            .create(CreateTenant {
                name: "Acme Clinic".into(),
                slug: "acme".into(),
                organization_name: None,
                max_employees: Some(25),
                admin: Some(NewAdmin {
                    username: "head.nurse".into(),
                    password: "lantern-orchid-4417".into(),
                    full_name: "Head Nurse".into(),
                }),
            })
            .await
            .unwrap();
        assert_eq!(tenant.settings.organization_name.as_deref(), Some("Acme Clinic"));
    }

    #[tokio::test]
    async fn test_weak_admin_password_creates_nothing() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_create().never();
        let result = service(tenants, MockWorkspaceRepository::new())
            .create(CreateTenant {
                name: "Acme".into(),
                slug: "acme".into(),
                organization_name: None,
                max_employees: None,
                admin: Some(NewAdmin {
                    username: "admin".into(),
                    password: "password".into(),
                    full_name: "Admin".into(),
                }),
            })
            .await;
        assert!(matches!(result, Err(DomainError::PasswordTooWeak)));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_slug() {
        let current = acme(true);
        let id = current.id;
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        tenants
            .expect_find_by_slug()
            .returning(|_| Ok(Some(Tenant::new("Beta", "beta", TenantSettings::default()).unwrap())));
        tenants.expect_update().never();

        let result = service(tenants, MockWorkspaceRepository::new())
            .update(&id, TenantUpdate { slug: Some("beta".into()), ..TenantUpdate::default() })
            .await;
        assert!(matches!(result, Err(DomainError::TenantSlugAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_activate_sets_subscription() {
        let pending = Tenant::signup("Acme", "acme", SubscriptionPlan::Monthly, None, None).unwrap();
        let id = pending.id;
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(pending.clone())));
        tenants.expect_update().returning(|t| Ok(t.clone()));

        let tenant = service(tenants, MockWorkspaceRepository::new())
            .activate(&id, Some(SubscriptionPlan::Yearly))
            .await
            .unwrap();
        let sub = tenant.subscription.unwrap();
        assert!(tenant.is_active);
        assert_eq!(sub.plan, SubscriptionPlan::Yearly);
        assert!(sub.expires_at.unwrap() > sub.started_at.unwrap());
    }

    #[tokio::test]
    async fn test_organization_name_is_trimmed_and_required() {
        let current = acme(true);
        let id = current.id;
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(move |_| Ok(Some(current.clone())));
        tenants
            .expect_update()
            .withf(|t| t.settings.organization_name.as_deref() == Some("Acme Health"))
            .times(1)
            .returning(|t| Ok(t.clone()));
        let service = service(tenants, MockWorkspaceRepository::new());

        assert_eq!(service.organization_name(&id).await.unwrap(), "Acme");
        assert_eq!(service.set_organization_name(&id, "  Acme Health ").await.unwrap(), "Acme Health");
        assert!(matches!(
            service.set_organization_name(&id, "   ").await,
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            service.set_organization_name(&id, &"x".repeat(201)).await,
            Err(DomainError::ValidationError(_))
        ));
    }
}
