//! Audit trail of roster cell changes

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use roster_shared::current_month_key;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub employee_id: String,
    pub employee_name: String,
    pub team: String,
    pub date: NaiveDate,
    pub old_shift: String,
    pub new_shift: String,
    pub modified_by: String,
    pub timestamp: DateTime<Utc>,
    /// `YYYY-MM` of `timestamp`.
    pub month_year: String,
}

impl Modification {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        employee_id: &str,
        employee_name: &str,
        team: &str,
        date: NaiveDate,
        old_shift: &str,
        new_shift: &str,
        modified_by: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            team: team.to_string(),
            date,
            old_shift: old_shift.to_string(),
            new_shift: new_shift.to_string(),
            modified_by: modified_by.to_string(),
            timestamp: now,
            month_year: current_month_key(now),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyStats {
    pub total_modifications: usize,
    pub employees_modified: usize,
    pub by_actor: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModificationOverview {
    pub month: String,
    pub stats: MonthlyStats,
    pub recent: Vec<Modification>,
}

/// Append-only log document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationLog {
    #[serde(default)]
    pub records: Vec<Modification>,
}

impl ModificationLog {
    pub fn append(&mut self, records: impl IntoIterator<Item = Modification>) {
        self.records.extend(records);
    }

    /// Statistics for `month` plus its `limit` most recent records.
    pub fn overview(&self, month: &str, limit: usize) -> ModificationOverview {
        let mut in_month: Vec<&Modification> = self.records.iter().filter(|m| m.month_year == month).collect();

        let mut stats = MonthlyStats {
            total_modifications: in_month.len(),
            ..MonthlyStats::default()
        };
        let employees: BTreeSet<&str> = in_month.iter().map(|m| m.employee_id.as_str()).collect();
        stats.employees_modified = employees.len();
        for record in &in_month {
            *stats.by_actor.entry(record.modified_by.clone()).or_default() += 1;
        }

        in_month.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        ModificationOverview {
            month: month.to_string(),
            stats,
            recent: in_month.into_iter().take(limit).cloned().collect(),
        }
    }
}
