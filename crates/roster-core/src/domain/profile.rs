//! Employee contact profiles

use std::collections::BTreeMap;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Contact details an employee or admin can edit. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmployeeProfile {
    #[serde(default)]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number too long"))]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(max = 500, message = "Address too long"))]
    pub address: Option<String>,

    #[serde(default)]
    pub gender: Option<Gender>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EmployeeProfile {
    /// Trims every text field and checks lengths and the e-mail address.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let profile = Self {
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            address: trimmed(self.address),
            gender: self.gender,
        };
        profile.validate()?;
        if let Some(email) = &profile.email {
            if !EmailAddress::is_valid(email) {
                return Err(DomainError::ValidationError(format!("Invalid email '{}'", email)));
            }
        }
        Ok(profile)
    }
}

/// The per-tenant profile document, keyed by roster employee id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileBook {
    #[serde(default)]
    pub profiles: BTreeMap<String, EmployeeProfile>,
}

impl ProfileBook {
    pub fn get(&self, employee_id: &str) -> EmployeeProfile {
        self.profiles
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(employee_id))
            .map(|(_, profile)| profile.clone())
            .unwrap_or_default()
    }

    pub fn set(&mut self, employee_id: &str, profile: EmployeeProfile) {
        self.profiles.retain(|id, _| !id.eq_ignore_ascii_case(employee_id));
        self.profiles.insert(employee_id.to_string(), profile);
    }

    /// Moves a profile when an employee is re-id'd.
    pub fn rename(&mut self, old_id: &str, new_id: &str) {
        if let Some(key) = self.profiles.keys().find(|id| id.eq_ignore_ascii_case(old_id)).cloned() {
            if let Some(profile) = self.profiles.remove(&key) {
                self.profiles.insert(new_id.to_string(), profile);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_and_checks_email() {
        let profile = EmployeeProfile {
            email: Some("  ann@clinic.test ".into()),
            phone: Some("   ".into()),
            address: None,
            gender: Some(Gender::Female),
        }
        .normalized()
        .unwrap();
        assert_eq!(profile.email.as_deref(), Some("ann@clinic.test"));
        assert_eq!(profile.phone, None);

        let bad = EmployeeProfile {
            email: Some("not-an-address".into()),
            ..EmployeeProfile::default()
        };
        assert!(matches!(bad.normalized(), Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_book_lookup_ignores_case() {
        let mut book = ProfileBook::default();
        book.set("E1", EmployeeProfile { phone: Some("555".into()), ..EmployeeProfile::default() });
        assert_eq!(book.get("e1").phone.as_deref(), Some("555"));

        book.set("e1", EmployeeProfile::default());
        assert_eq!(book.profiles.len(), 1);

        book.set("E2", EmployeeProfile { phone: Some("777".into()), ..EmployeeProfile::default() });
        book.rename("e2", "E9");
        assert_eq!(book.get("E9").phone.as_deref(), Some("777"));
        assert_eq!(book.get("E2"), EmployeeProfile::default());
    }
}
