//! Login identities: developers (global), admins and employees (per tenant)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    #[default]
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    #[serde(default)]
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

/// What may leave the process about an admin account.
#[derive(Debug, Clone, Serialize)]
pub struct AdminProfile {
    pub username: String,
    pub full_name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCredential {
    pub employee_id: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reset_token_hash: Option<String>,
    #[serde(default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmployeeCredential {
    pub fn new(employee_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            password_hash: None,
            email: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            status: CredentialStatus::Active,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    pub fn set_password(&mut self, hash: String, now: DateTime<Utc>) {
        self.password_hash = Some(hash);
        self.updated_at = Some(now);
    }

    pub fn set_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.reset_token_hash = Some(token_hash);
        self.reset_token_expires_at = Some(expires_at);
        self.updated_at = Some(now);
    }

    /// True when `token_hash` matches an unexpired token.
    pub fn reset_token_matches(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > now,
            _ => false,
        }
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_token_expires_at = None;
    }
}

/// Finds a credential by case-insensitive employee id.
pub fn find_credential<'a>(credentials: &'a [EmployeeCredential], employee_id: &str) -> Option<&'a EmployeeCredential> {
    credentials.iter().find(|c| c.employee_id.eq_ignore_ascii_case(employee_id.trim()))
}

pub fn find_credential_mut<'a>(
    credentials: &'a mut [EmployeeCredential],
    employee_id: &str,
) -> Option<&'a mut EmployeeCredential> {
    credentials.iter_mut().find(|c| c.employee_id.eq_ignore_ascii_case(employee_id.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_reset_token_expiry() {
        let now = Utc::now();
        let mut credential = EmployeeCredential::new("E1", now);
        assert!(!credential.reset_token_matches("abc", now));

        credential.set_reset_token("abc".into(), now + Duration::hours(24), now);
        assert!(credential.reset_token_matches("abc", now));
        assert!(!credential.reset_token_matches("abd", now));
        assert!(!credential.reset_token_matches("abc", now + Duration::hours(25)));

        credential.clear_reset_token();
        assert!(!credential.reset_token_matches("abc", now));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let credentials = vec![EmployeeCredential::new("Emp-7", Utc::now())];
        assert!(find_credential(&credentials, " emp-7 ").is_some());
        assert!(find_credential(&credentials, "emp-8").is_none());
    }
}
