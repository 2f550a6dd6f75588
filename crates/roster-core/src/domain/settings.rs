//! Per-tenant workspace settings: shift table and published-sheet links

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use roster_shared::constants::DEFAULT_SHIFT_DEFINITIONS;

use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// `None` until the tenant customises its shift table.
    #[serde(default)]
    pub shift_definitions: Option<BTreeMap<String, String>>,
    /// Month (`YYYY-MM`) to published CSV URL.
    #[serde(default)]
    pub sheet_links: BTreeMap<String, String>,
}

/// Canonical form of a shift code as typed by a user.
pub fn normalize_shift_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn default_shift_definitions() -> BTreeMap<String, String> {
    DEFAULT_SHIFT_DEFINITIONS
        .iter()
        .map(|(code, description)| (code.to_string(), description.to_string()))
        .collect()
}

impl WorkspaceSettings {
    pub fn shift_definitions(&self) -> BTreeMap<String, String> {
        self.shift_definitions.clone().unwrap_or_else(default_shift_definitions)
    }

    /// Empty is always accepted: it clears a cell.
    pub fn is_known_shift(&self, code: &str) -> bool {
        if code.is_empty() {
            return true;
        }
        match &self.shift_definitions {
            Some(custom) => custom.contains_key(code),
            None => DEFAULT_SHIFT_DEFINITIONS.iter().any(|(known, _)| *known == code),
        }
    }

    /// Normalises `raw` and checks it against the shift table.
    pub fn validate_shift(&self, raw: &str) -> Result<String, DomainError> {
        let code = normalize_shift_code(raw);
        if self.is_known_shift(&code) {
            Ok(code)
        } else {
            Err(DomainError::UnknownShiftCode(code))
        }
    }

    pub fn upsert_shift(&mut self, code: &str, description: &str) -> Result<(), DomainError> {
        let code = checked_code(code)?;
        self.shift_definitions
            .get_or_insert_with(default_shift_definitions)
            .insert(code, description.trim().to_string());
        Ok(())
    }

    pub fn remove_shift(&mut self, code: &str) -> Result<(), DomainError> {
        let code = normalize_shift_code(code);
        let table = self.shift_definitions.get_or_insert_with(default_shift_definitions);
        table
            .remove(&code)
            .map(|_| ())
            .ok_or(DomainError::ShiftDefinitionNotFound(code))
    }

    pub fn replace_shifts(&mut self, definitions: BTreeMap<String, String>) -> Result<(), DomainError> {
        let mut table = BTreeMap::new();
        for (code, description) in definitions {
            table.insert(checked_code(&code)?, description.trim().to_string());
        }
        self.shift_definitions = Some(table);
        Ok(())
    }
}

fn checked_code(raw: &str) -> Result<String, DomainError> {
    let code = normalize_shift_code(raw);
    if code.is_empty() || code.len() > 10 || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(DomainError::ValidationError(format!("Invalid shift code '{}'", raw.trim())));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_until_customised() {
        let mut settings = WorkspaceSettings::default();
        assert!(settings.is_known_shift("M2"));
        assert_eq!(settings.validate_shift(" do ").unwrap(), "DO");
        assert!(matches!(settings.validate_shift("ZZ"), Err(DomainError::UnknownShiftCode(_))));

        settings.upsert_shift("n1", "Night").unwrap();
        assert!(settings.is_known_shift("N1"));
        assert!(settings.is_known_shift("M2"));

        settings.remove_shift("M2").unwrap();
        assert!(!settings.is_known_shift("M2"));
        assert!(settings.remove_shift("M2").is_err());
    }

    #[test]
    fn test_replace_rejects_bad_codes() {
        let mut settings = WorkspaceSettings::default();
        let bad = BTreeMap::from([("has space".to_string(), "x".to_string())]);
        assert!(settings.replace_shifts(bad).is_err());

        let good = BTreeMap::from([("x1".to_string(), "Extra".to_string())]);
        settings.replace_shifts(good).unwrap();
        assert_eq!(settings.shift_definitions().len(), 1);
        assert!(settings.is_known_shift(""));
    }
}
