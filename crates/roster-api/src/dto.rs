//! Request and response payloads

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use roster_core::domain::{Decision, Modification, SubscriptionPlan};
use roster_core::services::{CreateTenant, NewAdmin, PublicTenantInfo, SignupRequest, TenantUpdate};

// ----------------------------------------------------------------------------
// Sessions
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeLoginRequest {
    #[validate(length(min = 1, max = 50, message = "Employee id is required"))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminMe {
    pub username: String,
    pub tenant: PublicTenantInfo,
}

#[derive(Debug, Serialize)]
pub struct EmployeeMe {
    pub employee_id: String,
    pub name: String,
    pub team: String,
    pub tenant: PublicTenantInfo,
}

#[derive(Debug, Serialize)]
pub struct DeveloperMe {
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PasswordLinkRequest {
    #[serde(default)]
    #[validate(length(max = 254))]
    pub email: Option<String>,
}

// ----------------------------------------------------------------------------
// Developer portal
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAdminBody {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
}

impl From<NewAdminBody> for NewAdmin {
    fn from(body: NewAdminBody) -> Self {
        Self {
            username: body.username,
            password: body.password,
            full_name: body.full_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantBody {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 63))]
    pub slug: String,
    pub organization_name: Option<String>,
    #[validate(range(min = 1, max = 100000))]
    pub max_employees: Option<u32>,
    #[validate(nested)]
    pub admin: Option<NewAdminBody>,
}

impl From<CreateTenantBody> for CreateTenant {
    fn from(body: CreateTenantBody) -> Self {
        Self {
            name: body.name,
            slug: body.slug,
            organization_name: body.organization_name,
            max_employees: body.max_employees,
            admin: body.admin.map(Into::into),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTenantBody {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 63))]
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub organization_name: Option<String>,
    #[validate(range(min = 1, max = 100000))]
    pub max_employees: Option<u32>,
}

impl From<UpdateTenantBody> for TenantUpdate {
    fn from(body: UpdateTenantBody) -> Self {
        Self {
            name: body.name,
            slug: body.slug,
            is_active: body.is_active,
            organization_name: body.organization_name,
            max_employees: body.max_employees,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivateBody {
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionBody {
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupBody {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 63))]
    pub slug: String,
    #[serde(default)]
    pub plan: SubscriptionPlan,
    pub contact_email: Option<String>,
    #[validate(length(max = 30))]
    pub contact_phone: Option<String>,
    #[validate(nested)]
    pub admin: Option<NewAdminBody>,
}

impl From<SignupBody> for SignupRequest {
    fn from(body: SignupBody) -> Self {
        Self {
            name: body.name,
            slug: body.slug,
            plan: body.plan,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            admin: body.admin.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SlugPath {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TenantIdPath {
    pub id: Uuid,
}

// ----------------------------------------------------------------------------
// Roster administration
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct NamePath {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CodePath {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthPath {
    pub month: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TeamBody {
    #[validate(length(min = 1, max = 100, message = "Team name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameTeamBody {
    #[validate(length(min = 1, max = 100, message = "Team name is required"))]
    pub new_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReactivateBody {
    #[validate(length(min = 1, max = 100, message = "Team is required"))]
    pub team: String,
}

#[derive(Debug, Serialize)]
pub struct ShiftUpdated {
    pub changed: bool,
    pub modification: Option<Modification>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Comma separated `YYYY-MM` keys.
    #[serde(default)]
    pub months: Option<String>,
}

impl ExportQuery {
    pub fn month_list(&self) -> Vec<String> {
        self.months
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShiftDefinitionBody {
    #[validate(length(min = 1, max = 10, message = "Shift code must be 1 to 10 characters"))]
    pub code: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ShiftDefinitionsBody {
    pub definitions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SheetLinkBody {
    #[validate(length(equal = 7, message = "Month must be YYYY-MM"))]
    pub month: String,
    #[validate(url(message = "A valid URL is required"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRequestBody {
    pub decision: Decision,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrganizationBody {
    #[validate(length(min = 1, max = 200, message = "Organization name must be between 1 and 200 characters"))]
    pub organization_name: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationsRead {
    pub last_read_at: DateTime<Utc>,
}
