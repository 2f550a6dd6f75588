// ============================================================================
// Roster Core - Roster Document
// File: crates/roster-core/src/domain/roster.rs
// Description: Per-tenant table of teams, employees and daily shift codes
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use roster_shared::constants::{INACTIVE_TEAM, UNASSIGNED_TEAM};

use super::employee::{Employee, EmployeeStatus};
use crate::error::DomainError;

/// The roster document. Invariants kept by every mutator:
/// `dates` is sorted and duplicate-free, each schedule has `dates.len()`
/// cells, and each employee's team is listed in `teams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// Outcome of writing one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftChange {
    pub old_shift: String,
    pub new_shift: String,
}

impl Roster {
    /// Repairs documents written by hand or by older versions.
    pub fn normalize(&mut self) {
        self.dates.sort();
        self.dates.dedup();
        let days = self.dates.len();
        for employee in &mut self.employees {
            employee.schedule.resize(days, String::new());
        }
        let missing: Vec<String> = self
            .employees
            .iter()
            .map(|e| e.team.clone())
            .filter(|team| !self.teams.contains(team))
            .collect();
        for team in missing {
            self.ensure_team(&team);
        }
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Inserts `date` in order, padding every schedule. Returns its index.
    pub fn insert_date(&mut self, date: NaiveDate) -> usize {
        match self.dates.binary_search(&date) {
            Ok(index) => index,
            Err(index) => {
                self.dates.insert(index, date);
                for employee in &mut self.employees {
                    employee.schedule.insert(index, String::new());
                }
                index
            }
        }
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.has_id(id))
    }

    pub fn employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.has_id(id))
    }

    pub fn active_employee_count(&self) -> usize {
        self.employees.iter().filter(|e| e.is_active()).count()
    }

    pub fn has_team(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t == name)
    }

    pub fn ensure_team(&mut self, name: &str) {
        if !self.has_team(name) {
            self.teams.push(name.to_string());
        }
    }

    pub fn add_team(&mut self, name: &str) -> Result<(), DomainError> {
        let name = team_name(name)?;
        if self.has_team(&name) {
            return Err(DomainError::TeamAlreadyExists(name));
        }
        self.teams.push(name);
        Ok(())
    }

    pub fn rename_team(&mut self, old: &str, new: &str) -> Result<(), DomainError> {
        let new = team_name(new)?;
        let index = self
            .teams
            .iter()
            .position(|t| t == old)
            .ok_or_else(|| DomainError::TeamNotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if self.has_team(&new) {
            return Err(DomainError::TeamAlreadyExists(new));
        }
        for employee in self.employees.iter_mut().filter(|e| e.team == old) {
            employee.team = new.clone();
        }
        self.teams[index] = new;
        Ok(())
    }

    /// Removes a team; its members move to the unassigned team.
    /// Returns how many employees moved.
    pub fn delete_team(&mut self, name: &str) -> Result<usize, DomainError> {
        if !self.has_team(name) {
            return Err(DomainError::TeamNotFound(name.to_string()));
        }
        if name == UNASSIGNED_TEAM || name == INACTIVE_TEAM {
            return Err(DomainError::ValidationError(format!("Team '{}' is reserved", name)));
        }
        let mut moved = 0;
        for employee in self.employees.iter_mut().filter(|e| e.team == name) {
            employee.team = UNASSIGNED_TEAM.to_string();
            moved += 1;
        }
        self.teams.retain(|t| t != name);
        if moved > 0 {
            self.ensure_team(UNASSIGNED_TEAM);
        }
        Ok(moved)
    }

    pub fn add_employee(&mut self, id: &str, name: &str, team: &str) -> Result<&Employee, DomainError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DomainError::ValidationError("Employee id is required".into()));
        }
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("Employee name is required".into()));
        }
        if self.employee(id).is_some() {
            return Err(DomainError::EmployeeAlreadyExists(id.to_string()));
        }
        if !self.has_team(team) {
            return Err(DomainError::TeamNotFound(team.to_string()));
        }
        self.employees.push(Employee::new(id, name, team, self.dates.len()));
        let index = self.employees.len() - 1;
        Ok(&self.employees[index])
    }

    /// Renames, re-ids or moves an employee. `None` leaves a field as is.
    pub fn edit_employee(
        &mut self,
        id: &str,
        new_id: Option<&str>,
        name: Option<&str>,
        team: Option<&str>,
    ) -> Result<&Employee, DomainError> {
        let new_id = new_id.map(str::trim).filter(|n| !n.is_empty());
        if let Some(new_id) = new_id {
            if !new_id.eq_ignore_ascii_case(id.trim()) && self.employee(new_id).is_some() {
                return Err(DomainError::EmployeeAlreadyExists(new_id.to_string()));
            }
        }
        if let Some(team) = team {
            if !self.has_team(team) {
                return Err(DomainError::TeamNotFound(team.to_string()));
            }
        }
        let employee = self
            .employee_mut(id)
            .ok_or_else(|| DomainError::EmployeeNotFound(id.to_string()))?;
        if let Some(new_id) = new_id {
            employee.id = new_id.to_string();
        }
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            employee.name = name.to_string();
        }
        if let Some(team) = team {
            employee.team = team.to_string();
        }
        Ok(employee)
    }

    pub fn deactivate_employee(&mut self, id: &str, now: DateTime<Utc>) -> Result<&Employee, DomainError> {
        if self.employee(id).is_none() {
            return Err(DomainError::EmployeeNotFound(id.to_string()));
        }
        self.ensure_team(INACTIVE_TEAM);
        let employee = self
            .employee_mut(id)
            .ok_or_else(|| DomainError::EmployeeNotFound(id.to_string()))?;
        employee.status = EmployeeStatus::Inactive;
        employee.team = INACTIVE_TEAM.to_string();
        employee.deactivated_at = Some(now);
        Ok(employee)
    }

    pub fn reactivate_employee(&mut self, id: &str, team: &str) -> Result<&Employee, DomainError> {
        if team == INACTIVE_TEAM {
            return Err(DomainError::ValidationError("Choose an active team".into()));
        }
        if !self.has_team(team) {
            return Err(DomainError::TeamNotFound(team.to_string()));
        }
        let employee = self
            .employee_mut(id)
            .ok_or_else(|| DomainError::EmployeeNotFound(id.to_string()))?;
        employee.status = EmployeeStatus::Active;
        employee.team = team.to_string();
        employee.deactivated_at = None;
        Ok(employee)
    }

    pub fn shift_on(&self, employee_id: &str, date: NaiveDate) -> Result<&str, DomainError> {
        let index = self.date_index(date).ok_or(DomainError::DateNotInRoster(date))?;
        let employee = self
            .employee(employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
        Ok(employee.schedule.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Writes one cell. Returns `None` when the cell already held `code`.
    pub fn set_shift(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        code: &str,
    ) -> Result<Option<ShiftChange>, DomainError> {
        let index = self.date_index(date).ok_or(DomainError::DateNotInRoster(date))?;
        let days = self.dates.len();
        let employee = self
            .employee_mut(employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
        employee.schedule.resize(days, String::new());
        if employee.schedule[index] == code {
            return Ok(None);
        }
        let old_shift = std::mem::replace(&mut employee.schedule[index], code.to_string());
        Ok(Some(ShiftChange {
            old_shift,
            new_shift: code.to_string(),
        }))
    }
}

fn team_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::ValidationError("Team name is required".into()));
    }
    if name.len() > 100 {
        return Err(DomainError::ValidationError("Team name too long".into()));
    }
    Ok(name.to_string())
}
