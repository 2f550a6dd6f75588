// ============================================================================
// Roster Core - Authentication Service
// File: crates/roster-core/src/services/auth_service.rs
// ============================================================================
//! Logins for the three credential stores, session checks and password links

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use email_address::EmailAddress;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use roster_security::token::{generate_token, hash_token};
use roster_security::{JwtService, PasswordService, SessionClaims, SessionRole};
use roster_shared::constants::RESET_TOKEN_TTL_HOURS;
use roster_shared::utils::mask_email;

use crate::domain::{find_credential, find_credential_mut, DeveloperUser, EmployeeCredential, Tenant};
use crate::error::DomainError;
use crate::ports::{Mailer, PasswordLinkMail};
use crate::repositories::{DeveloperRepository, WorkspaceRepository};
use crate::services::locks::TenantLocks;

#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Accept the employee id as the first password when no credential exists.
    pub default_employee_password: bool,
    /// Public origin used to build password links.
    pub reset_link_base: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    #[serde(skip)]
    pub token: String,
    pub role: SessionRole,
    pub subject: String,
    pub display_name: String,
    pub tenant_id: Option<Uuid>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordLinkIssued {
    pub employee_id: String,
    pub link: String,
    pub expires_at: DateTime<Utc>,
    pub delivered_to: Option<String>,
}

pub struct AuthService {
    developers: Arc<dyn DeveloperRepository>,
    workspace: Arc<dyn WorkspaceRepository>,
    mailer: Arc<dyn Mailer>,
    jwt: Arc<JwtService>,
    locks: Arc<TenantLocks>,
    options: AuthOptions,
}

impl AuthService {
    pub fn new(
        developers: Arc<dyn DeveloperRepository>,
        workspace: Arc<dyn WorkspaceRepository>,
        mailer: Arc<dyn Mailer>,
        jwt: Arc<JwtService>,
        locks: Arc<TenantLocks>,
        options: AuthOptions,
    ) -> Self {
        Self {
            developers,
            workspace,
            mailer,
            jwt,
            locks,
            options,
        }
    }

    /// Creates the first developer account. Returns false when one exists.
    pub async fn bootstrap_developer(&self, username: &str, password: &str, full_name: &str) -> Result<bool, DomainError> {
        if self.developers.count().await? > 0 {
            return Ok(false);
        }
        PasswordService::check_strength(password, &[username, full_name])?;
        let developer = DeveloperUser {
            username: username.trim().to_string(),
            password_hash: PasswordService::hash(password)?,
            full_name: full_name.trim().to_string(),
            created_at: Utc::now(),
        };
        self.developers.create(&developer).await?;
        info!("Bootstrap developer created: {}", developer.username);
        Ok(true)
    }

    pub async fn developer_login(&self, username: &str, password: &str) -> Result<SessionGrant, DomainError> {
        let developer = self.developers.find_by_username(username.trim()).await?.ok_or_else(|| {
            warn!("Developer login failed: unknown user {}", username);
            DomainError::InvalidCredentials
        })?;
        verify_password(password, &developer.password_hash)?;

        info!("Developer login: {}", developer.username);
        self.grant(&developer.username, &developer.full_name, SessionRole::Developer, None)
    }

    pub async fn admin_login(&self, tenant: &Tenant, username: &str, password: &str) -> Result<SessionGrant, DomainError> {
        let admins = self.workspace.load_admins(&tenant.id).await?;
        let admin = admins
            .iter()
            .find(|a| a.username.eq_ignore_ascii_case(username.trim()))
            .ok_or_else(|| {
                warn!("Admin login failed on {}: unknown user {}", tenant.slug, username);
                DomainError::InvalidCredentials
            })?;
        verify_password(password, &admin.password_hash)?;

        info!("Admin login on {}: {}", tenant.slug, admin.username);
        self.grant(&admin.username, &admin.full_name, SessionRole::Admin, Some(tenant.id))
    }

    pub async fn employee_login(
        &self,
        tenant: &Tenant,
        employee_id: &str,
        password: &str,
    ) -> Result<SessionGrant, DomainError> {
        let roster = self.workspace.load_roster(&tenant.id).await?;
        let employee = roster.employee(employee_id).ok_or_else(|| {
            warn!("Employee login failed on {}: unknown id {}", tenant.slug, employee_id);
            DomainError::InvalidCredentials
        })?;
        if !employee.is_active() {
            return Err(DomainError::AccountNotActive);
        }

        let credentials = self.workspace.load_credentials(&tenant.id).await?;
        match find_credential(&credentials, &employee.id) {
            Some(credential) if !credential.is_active() => return Err(DomainError::AccountNotActive),
            Some(EmployeeCredential {
                password_hash: Some(hash),
                ..
            }) => verify_password(password, hash)?,
            _ => {
                self.check_default_password(&employee.id, password)?;
                self.materialise_credential(&tenant.id, &employee.id).await?;
            }
        }

        info!("Employee login on {}: {}", tenant.slug, employee.id);
        self.grant(&employee.id, &employee.name, SessionRole::Employee, Some(tenant.id))
    }

    /// Validates a session token for the given role and tenant scope.
    pub fn authorize(&self, token: &str, role: SessionRole, tenant_id: Option<Uuid>) -> Result<SessionClaims, DomainError> {
        self.jwt.validate_scoped(token, role, tenant_id).map_err(|e| {
            warn!("Session rejected for {} endpoint: {}", role, e);
            DomainError::Unauthorized
        })
    }

    pub async fn change_employee_password(
        &self,
        tenant_id: &Uuid,
        employee_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        PasswordService::check_strength(new_password, &[employee_id])?;

        let _guard = self.locks.acquire(tenant_id).await;
        let roster = self.workspace.load_roster(tenant_id).await?;
        if !roster.employee(employee_id).is_some_and(|e| e.is_active()) {
            return Err(DomainError::AccountNotActive);
        }
        let mut credentials = self.workspace.load_credentials(tenant_id).await?;
        match find_credential(&credentials, employee_id) {
            Some(credential) if !credential.is_active() => return Err(DomainError::AccountNotActive),
            Some(EmployeeCredential {
                password_hash: Some(hash),
                ..
            }) => verify_password(current_password, hash)?,
            _ => self.check_default_password(employee_id, current_password)?,
        }

        let now = Utc::now();
        let hash = PasswordService::hash(new_password)?;
        match find_credential_mut(&mut credentials, employee_id) {
            Some(credential) => credential.set_password(hash, now),
            None => {
                let mut credential = EmployeeCredential::new(employee_id, now);
                credential.set_password(hash, now);
                credentials.push(credential);
            }
        }
        self.workspace.save_credentials(tenant_id, &credentials).await?;
        info!("Password changed for employee {}", employee_id);
        Ok(())
    }

    /// Issues a single-use set-password link and mails it when an address
    /// is known. The link is also returned so an admin can hand it over.
    pub async fn issue_password_link(
        &self,
        tenant: &Tenant,
        employee_id: &str,
        email: Option<String>,
    ) -> Result<PasswordLinkIssued, DomainError> {
        let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        if let Some(address) = &email {
            if !EmailAddress::is_valid(address) {
                return Err(DomainError::ValidationError(format!("Invalid email '{}'", address)));
            }
        }

        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::hours(RESET_TOKEN_TTL_HOURS);

        let (employee_id, employee_name, delivered_to) = {
            let _guard = self.locks.acquire(&tenant.id).await;
            let roster = self.workspace.load_roster(&tenant.id).await?;
            let employee = roster
                .employee(employee_id)
                .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
            if !employee.is_active() {
                return Err(DomainError::EmployeeNotActive(employee.id.clone()));
            }

            let mut credentials = self.workspace.load_credentials(&tenant.id).await?;
            if find_credential(&credentials, &employee.id).is_none() {
                credentials.push(EmployeeCredential::new(&employee.id, now));
            }
            let credential = find_credential_mut(&mut credentials, &employee.id)
                .ok_or_else(|| DomainError::InternalError("credential vanished".into()))?;
            if email.is_some() {
                credential.email = email;
            }
            credential.set_reset_token(hash_token(&token), expires_at, now);
            let delivered_to = credential.email.clone();
            self.workspace.save_credentials(&tenant.id, &credentials).await?;
            (employee.id.clone(), employee.name.clone(), delivered_to)
        };

        let link = format!(
            "{}/t/{}/set-password?token={}",
            self.options.reset_link_base.trim_end_matches('/'),
            tenant.slug,
            token
        );
        if let Some(address) = &delivered_to {
            let mail = PasswordLinkMail {
                to: address.clone(),
                employee_name,
                organization: tenant.display_name().to_string(),
                link: link.clone(),
            };
            if let Err(e) = self.mailer.send_password_link(&mail).await {
                error!("Password link mail to {} failed: {}", mask_email(address), e);
            } else {
                info!("Password link sent to {}", mask_email(address));
            }
        }

        Ok(PasswordLinkIssued {
            employee_id,
            link,
            expires_at,
            delivered_to: delivered_to.as_deref().map(mask_email),
        })
    }

    /// Sets a password with a link token. The token is consumed.
    pub async fn reset_password_with_token(
        &self,
        tenant_id: &Uuid,
        token: &str,
        new_password: &str,
    ) -> Result<String, DomainError> {
        let token_hash = hash_token(token.trim());
        let now = Utc::now();

        let _guard = self.locks.acquire(tenant_id).await;
        let mut credentials = self.workspace.load_credentials(tenant_id).await?;
        let credential = credentials
            .iter_mut()
            .find(|c| c.reset_token_matches(&token_hash, now))
            .ok_or(DomainError::InvalidToken)?;
        if !credential.is_active() {
            return Err(DomainError::AccountNotActive);
        }
        PasswordService::check_strength(new_password, &[credential.employee_id.as_str()])?;

        credential.set_password(PasswordService::hash(new_password)?, now);
        credential.clear_reset_token();
        let employee_id = credential.employee_id.clone();
        self.workspace.save_credentials(tenant_id, &credentials).await?;
        info!("Password set from link for employee {}", employee_id);
        Ok(employee_id)
    }

    fn grant(
        &self,
        subject: &str,
        display_name: &str,
        role: SessionRole,
        tenant_id: Option<Uuid>,
    ) -> Result<SessionGrant, DomainError> {
        let token = self
            .jwt
            .issue(subject, role, tenant_id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;
        Ok(SessionGrant {
            token,
            role,
            subject: subject.to_string(),
            display_name: display_name.to_string(),
            tenant_id,
            expires_in: self.jwt.session_ttl(),
        })
    }

    fn check_default_password(&self, employee_id: &str, password: &str) -> Result<(), DomainError> {
        if self.options.default_employee_password && password.trim().eq_ignore_ascii_case(employee_id) {
            Ok(())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    /// Stores a hashed copy of the default password on first login.
    async fn materialise_credential(&self, tenant_id: &Uuid, employee_id: &str) -> Result<(), DomainError> {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut credentials = self.workspace.load_credentials(tenant_id).await?;
        let now = Utc::now();
        match find_credential_mut(&mut credentials, employee_id) {
            Some(credential) if credential.password_hash.is_some() => return Ok(()),
            Some(credential) => credential.set_password(PasswordService::hash(employee_id)?, now),
            None => {
                let mut credential = EmployeeCredential::new(employee_id, now);
                credential.set_password(PasswordService::hash(employee_id)?, now);
                credentials.push(credential);
            }
        }
        self.workspace.save_credentials(tenant_id, &credentials).await
    }
}

fn verify_password(password: &str, hash: &str) -> Result<(), DomainError> {
    match PasswordService::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(DomainError::InvalidCredentials),
        Err(e) => {
            error!("Stored password hash unreadable: {}", e);
            Err(DomainError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdminRole, AdminUser, Roster, TenantSettings};
    use crate::ports::MockMailer;
    use crate::repositories::{MockDeveloperRepository, MockWorkspaceRepository};
    use std::sync::Mutex;

    fn tenant() -> Tenant {
        Tenant::new("Acme", "acme", TenantSettings::default()).unwrap()
    }

    fn roster() -> Roster {
        let mut roster = Roster::default();
        roster.add_team("Ward A").unwrap();
        roster.add_employee("E100", "Alice", "Ward A").unwrap();
        roster
    }

    fn service(developers: MockDeveloperRepository, workspace: MockWorkspaceRepository, mailer: MockMailer) -> AuthService {
        AuthService::new(
            Arc::new(developers),
            Arc::new(workspace),
            Arc::new(mailer),
            Arc::new(JwtService::new("unit-test-secret", 3600)),
            Arc::new(TenantLocks::new()),
            AuthOptions {
                default_employee_password: true,
                reset_link_base: "https://roster.example.com/".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_admin_login_issues_scoped_session() {
        let tenant = tenant();
        let hash = PasswordService::hash("harbor-violet-8812").unwrap();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_admins().returning(move |_| {
            Ok(vec![AdminUser {
                username: "boss".into(),
                password_hash: hash.clone(),
                full_name: "The Boss".into(),
                role: AdminRole::Admin,
                created_at: Utc::now(),
            }])
        });
        let auth = service(MockDeveloperRepository::new(), workspace, MockMailer::new());

        let grant = auth.admin_login(&tenant, "BOSS", "harbor-violet-8812").await.unwrap();
        assert!(auth.authorize(&grant.token, SessionRole::Admin, Some(tenant.id)).is_ok());
        assert!(auth.authorize(&grant.token, SessionRole::Employee, Some(tenant.id)).is_err());
        assert!(auth.authorize(&grant.token, SessionRole::Admin, Some(Uuid::new_v4())).is_err());

        assert!(matches!(
            auth.admin_login(&tenant, "boss", "wrong").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_first_employee_login_materialises_credential() {
        let tenant = tenant();
        let saved: Arc<Mutex<Vec<EmployeeCredential>>> = Arc::default();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| Ok(roster()));
        workspace.expect_load_credentials().returning(|_| Ok(Vec::new()));
        let sink = saved.clone();
        workspace.expect_save_credentials().times(1).returning(move |_, creds| {
            *sink.lock().unwrap() = creds.to_vec();
            Ok(())
        });
        let auth = service(MockDeveloperRepository::new(), workspace, MockMailer::new());

        let grant = auth.employee_login(&tenant, "e100", "E100").await.unwrap();
        assert_eq!(grant.subject, "E100");
        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(PasswordService::verify("E100", saved[0].password_hash.as_deref().unwrap()).unwrap());
    }

    #[tokio::test]
    async fn test_inactive_credential_refused() {
        let tenant = tenant();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| Ok(roster()));
        workspace.expect_load_credentials().returning(|_| {
            let mut credential = EmployeeCredential::new("E100", Utc::now());
            credential.status = crate::domain::CredentialStatus::Inactive;
            Ok(vec![credential])
        });
        let auth = service(MockDeveloperRepository::new(), workspace, MockMailer::new());

        assert!(matches!(
            auth.employee_login(&tenant, "E100", "E100").await,
            Err(DomainError::AccountNotActive)
        ));
    }

    #[tokio::test]
    async fn test_password_change_refused_for_deactivated_accounts() {
        let tenant = tenant();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| {
            let mut roster = roster();
            roster.add_employee("E200", "Bob", "Ward A").unwrap();
            roster.deactivate_employee("E200", Utc::now()).unwrap();
            Ok(roster)
        });
        workspace.expect_load_credentials().returning(|_| {
            let mut credential = EmployeeCredential::new("E100", Utc::now());
            credential.status = crate::domain::CredentialStatus::Inactive;
            Ok(vec![credential])
        });
        workspace.expect_save_credentials().never();
        let auth = service(MockDeveloperRepository::new(), workspace, MockMailer::new());

        for employee_id in ["E100", "E200"] {
            assert!(matches!(
                auth.change_employee_password(&tenant.id, employee_id, employee_id, "harbor-violet-8812")
                    .await,
                Err(DomainError::AccountNotActive)
            ));
        }
    }

    #[tokio::test]
    async fn test_password_link_is_single_use() {
        let tenant = tenant();
        let store: Arc<Mutex<Vec<EmployeeCredential>>> = Arc::default();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| Ok(roster()));
        let reader = store.clone();
        workspace
            .expect_load_credentials()
            .returning(move |_| Ok(reader.lock().unwrap().clone()));
        let writer = store.clone();
        workspace.expect_save_credentials().returning(move |_, creds| {
            *writer.lock().unwrap() = creds.to_vec();
            Ok(())
        });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_password_link()
            .withf(|mail| mail.to == "alice@example.com" && mail.link.starts_with("https://roster.example.com/t/acme/"))
            .times(1)
            .returning(|_| Ok(()));
        let auth = service(MockDeveloperRepository::new(), workspace, mailer);

        let issued = auth
            .issue_password_link(&tenant, "E100", Some("alice@example.com".into()))
            .await
            .unwrap();
        let token = issued.link.rsplit('=').next().unwrap().to_string();

        let id = auth
            .reset_password_with_token(&tenant.id, &token, "quartz-meadow-5150")
            .await
            .unwrap();
        assert_eq!(id, "E100");
        assert!(matches!(
            auth.reset_password_with_token(&tenant.id, &token, "quartz-meadow-5150").await,
            Err(DomainError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_only_when_empty() {
        let mut developers = MockDeveloperRepository::new();
        developers.expect_count().returning(|| Ok(1));
        developers.expect_create().never();
        let auth = service(developers, MockWorkspaceRepository::new(), MockMailer::new());

        assert!(!auth.bootstrap_developer("root", "ember-falcon-2231", "Root").await.unwrap());
    }
}
