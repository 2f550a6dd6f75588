//! Employee entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

/// A roster row. `schedule[i]` is the shift code on `Roster::dates[i]`;
/// an empty string means unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(id: &str, name: &str, team: &str, days: usize) -> Self {
        Self {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            team: team.trim().to_string(),
            schedule: vec![String::new(); days],
            status: EmployeeStatus::Active,
            deactivated_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Employee ids compare case-insensitively.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id.trim())
    }
}
