// ============================================================================
// Roster Core - Tenant Entity
// File: crates/roster-core/src/domain/tenant.rs
// Description: Tenant entity with subscription lifecycle
// ============================================================================

use chrono::{DateTime, Months, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use roster_shared::utils::{is_valid_slug, normalize_slug};

use crate::error::DomainError;

/// Subscription plan enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Monthly => "monthly",
            SubscriptionPlan::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Some(SubscriptionPlan::Monthly),
            "yearly" => Some(SubscriptionPlan::Yearly),
            _ => None,
        }
    }

    /// End of a billing period starting at `start`.
    pub fn expires_after(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            SubscriptionPlan::Monthly => Months::new(1),
            SubscriptionPlan::Yearly => Months::new(12),
        };
        start.checked_add_months(months).unwrap_or(start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn pending(plan: SubscriptionPlan, now: DateTime<Utc>) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Pending,
            created_at: now,
            started_at: None,
            expires_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TenantSettings {
    #[validate(length(max = 200, message = "Organization name too long"))]
    pub organization_name: Option<String>,

    #[validate(range(min = 1, max = 100000, message = "Max employees must be between 1 and 100000"))]
    pub max_employees: Option<u32>,
}

/// Tenant entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Tenant name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 2, max = 63, message = "Slug must be between 2 and 63 characters"))]
    pub slug: String,

    pub is_active: bool,

    #[validate(nested)]
    #[serde(default)]
    pub settings: TenantSettings,

    #[serde(default)]
    pub subscription: Option<Subscription>,

    #[serde(default)]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub contact_phone: Option<String>,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tenant {
    /// Tenant created from the developer portal; usable immediately.
    pub fn new(name: &str, slug: &str, settings: TenantSettings) -> Result<Self, DomainError> {
        let tenant = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug: normalize_slug(slug),
            is_active: true,
            settings,
            subscription: None,
            contact_email: None,
            contact_phone: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        tenant.check()?;
        Ok(tenant)
    }

    /// Self-serve signup: inactive until a developer activates it.
    pub fn signup(
        name: &str,
        slug: &str,
        plan: SubscriptionPlan,
        contact_email: Option<String>,
        contact_phone: Option<String>,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        let tenant = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug: normalize_slug(slug),
            is_active: false,
            settings: TenantSettings {
                organization_name: Some(name.trim().to_string()),
                max_employees: None,
            },
            subscription: Some(Subscription::pending(plan, now)),
            contact_email: contact_email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            contact_phone: contact_phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            created_at: now,
            updated_at: None,
        };
        tenant.check()?;
        Ok(tenant)
    }

    /// Field validation plus the slug character rules.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if let Some(email) = &self.contact_email {
            if !EmailAddress::is_valid(email) {
                return Err(DomainError::ValidationError(format!("Invalid contact email '{}'", email)));
            }
        }
        if !is_valid_slug(&self.slug) {
            return Err(DomainError::ValidationError(format!(
                "Invalid slug '{}': use lowercase letters, digits and hyphens",
                self.slug
            )));
        }
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        let plan = self.subscription.as_ref().map(|s| s.plan).unwrap_or_default();
        let created_at = self.subscription.as_ref().map(|s| s.created_at).unwrap_or(now);
        self.subscription = Some(Subscription {
            plan,
            status: SubscriptionStatus::Active,
            created_at,
            started_at: Some(now),
            expires_at: Some(plan.expires_after(now)),
        });
        self.is_active = true;
        self.updated_at = Some(now);
    }

    /// Changes the plan; an active subscription keeps its start date and
    /// gets a recomputed expiry.
    pub fn set_plan(&mut self, plan: SubscriptionPlan, now: DateTime<Utc>) {
        match self.subscription.as_mut() {
            Some(sub) => {
                sub.plan = plan;
                if let Some(started_at) = sub.started_at {
                    sub.expires_at = Some(plan.expires_after(started_at));
                }
            }
            None => self.subscription = Some(Subscription::pending(plan, now)),
        }
        self.updated_at = Some(now);
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = Some(now);
    }

    pub fn display_name(&self) -> &str {
        self.settings.organization_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_tenant() {
        let tenant = Tenant::new("Acme Hospital", "Acme", TenantSettings::default()).unwrap();
        assert_eq!(tenant.slug, "acme");
        assert!(tenant.is_active);
        assert!(tenant.subscription.is_none());
    }

    #[test]
    fn test_invalid_slug_rejected() {
        assert!(Tenant::new("Acme", "-", TenantSettings::default()).is_err());
        assert!(Tenant::new("A", "acme", TenantSettings::default()).is_err());
    }

    #[test]
    fn test_signup_is_pending_until_activated() {
        let mut tenant = Tenant::signup("North Wing", "north-wing", SubscriptionPlan::Yearly, None, None).unwrap();
        assert!(!tenant.is_active);
        assert_eq!(tenant.subscription.as_ref().unwrap().status, SubscriptionStatus::Pending);

        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        tenant.activate(now);
        let sub = tenant.subscription.unwrap();
        assert!(tenant.is_active);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.expires_at, Some(Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap()));
    }

    #[test]
    fn test_signup_rejects_bad_email() {
        let result = Tenant::signup("North Wing", "north-wing", SubscriptionPlan::Monthly, Some("nope".into()), None);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_monthly_expiry_clamps_to_month_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let end = SubscriptionPlan::Monthly.expires_after(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_plan_change_recomputes_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut tenant = Tenant::new("Acme", "acme", TenantSettings::default()).unwrap();
        tenant.activate(now);
        tenant.set_plan(SubscriptionPlan::Yearly, now);
        assert_eq!(
            tenant.subscription.unwrap().expires_at,
            Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap())
        );
    }
}
