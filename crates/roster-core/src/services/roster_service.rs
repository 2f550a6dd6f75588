// ============================================================================
// Roster Core - Roster Service
// File: crates/roster-core/src/services/roster_service.rs
// ============================================================================
//! Teams, employees, shifts, CSV exchange and workspace settings

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use roster_shared::constants::RECENT_MODIFICATIONS_LIMIT;
use roster_shared::current_month_key;
use roster_shared::utils::is_valid_month_key;

use crate::domain::{
    find_credential, find_credential_mut, CredentialStatus, Employee, EmployeeProfile, Modification,
    ModificationOverview, Roster, Tenant, WorkspaceSettings,
};
use crate::error::DomainError;
use crate::ports::SheetFetcher;
use crate::repositories::WorkspaceRepository;
use crate::roster_csv::{self, ImportSummary};
use crate::services::locks::TenantLocks;

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub id: String,
    pub name: String,
    pub team: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeUpdate {
    pub new_id: Option<String>,
    pub name: Option<String>,
    pub team: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShiftUpdate {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub shift: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeSchedule {
    pub employee_id: String,
    pub name: String,
    pub team: String,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub employee_id: String,
    pub name: String,
    pub team: String,
    #[serde(flatten)]
    pub profile: EmployeeProfile,
}

pub struct RosterService {
    workspace: Arc<dyn WorkspaceRepository>,
    locks: Arc<TenantLocks>,
    fetcher: Arc<dyn SheetFetcher>,
}

impl RosterService {
    pub fn new(workspace: Arc<dyn WorkspaceRepository>, locks: Arc<TenantLocks>, fetcher: Arc<dyn SheetFetcher>) -> Self {
        Self {
            workspace,
            locks,
            fetcher,
        }
    }

    pub async fn roster(&self, tenant_id: &Uuid) -> Result<Roster, DomainError> {
        self.workspace.load_roster(tenant_id).await
    }

    pub async fn employee_schedule(&self, tenant_id: &Uuid, employee_id: &str) -> Result<EmployeeSchedule, DomainError> {
        let roster = self.workspace.load_roster(tenant_id).await?;
        let employee = roster
            .employee(employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
        Ok(EmployeeSchedule {
            employee_id: employee.id.clone(),
            name: employee.name.clone(),
            team: employee.team.clone(),
            entries: roster
                .dates
                .iter()
                .zip(employee.schedule.iter())
                .map(|(date, shift)| ScheduleEntry {
                    date: *date,
                    shift: shift.clone(),
                })
                .collect(),
        })
    }

    pub async fn add_team(&self, tenant_id: &Uuid, name: &str) -> Result<Roster, DomainError> {
        self.mutate_roster(tenant_id, |roster| roster.add_team(name)).await
    }

    pub async fn rename_team(&self, tenant_id: &Uuid, old: &str, new: &str) -> Result<Roster, DomainError> {
        self.mutate_roster(tenant_id, |roster| roster.rename_team(old, new)).await
    }

    pub async fn delete_team(&self, tenant_id: &Uuid, name: &str) -> Result<Roster, DomainError> {
        self.mutate_roster(tenant_id, |roster| {
            let moved = roster.delete_team(name)?;
            info!("Team {} deleted, {} employees unassigned", name, moved);
            Ok(())
        })
        .await
    }

    pub async fn add_employee(&self, tenant: &Tenant, employee: NewEmployee) -> Result<Employee, DomainError> {
        let _guard = self.locks.acquire(&tenant.id).await;
        let mut roster = self.workspace.load_roster(&tenant.id).await?;

        if let Some(limit) = tenant.settings.max_employees {
            if roster.active_employee_count() >= limit as usize {
                return Err(DomainError::EmployeeLimitReached(limit));
            }
        }
        let credentials = self.workspace.load_credentials(&tenant.id).await?;
        if find_credential(&credentials, &employee.id).is_some() {
            return Err(DomainError::EmployeeAlreadyExists(employee.id.trim().to_string()));
        }

        let added = roster.add_employee(&employee.id, &employee.name, &employee.team)?.clone();
        self.workspace.save_roster(&tenant.id, &roster).await?;
        info!("Employee {} added to team {}", added.id, added.team);
        Ok(added)
    }

    pub async fn edit_employee(&self, tenant_id: &Uuid, id: &str, update: EmployeeUpdate) -> Result<Employee, DomainError> {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut roster = self.workspace.load_roster(tenant_id).await?;
        let mut credentials = self.workspace.load_credentials(tenant_id).await?;

        let new_id = update.new_id.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let re_id = new_id.filter(|n| !n.eq_ignore_ascii_case(id.trim()));
        if let Some(new_id) = re_id {
            if find_credential(&credentials, new_id).is_some() {
                return Err(DomainError::EmployeeAlreadyExists(new_id.to_string()));
            }
        }

        let edited = roster
            .edit_employee(id, new_id, update.name.as_deref(), update.team.as_deref())?
            .clone();
        self.workspace.save_roster(tenant_id, &roster).await?;

        if re_id.is_some() {
            if let Some(credential) = find_credential_mut(&mut credentials, id) {
                credential.employee_id = edited.id.clone();
                self.workspace.save_credentials(tenant_id, &credentials).await?;
            }
            let mut profiles = self.workspace.load_profiles(tenant_id).await?;
            if profiles.profiles.keys().any(|k| k.eq_ignore_ascii_case(id.trim())) {
                profiles.rename(id.trim(), &edited.id);
                self.workspace.save_profiles(tenant_id, &profiles).await?;
            }
        }
        Ok(edited)
    }

    pub async fn employee_profile(&self, tenant_id: &Uuid, employee_id: &str) -> Result<ProfileView, DomainError> {
        let roster = self.workspace.load_roster(tenant_id).await?;
        let employee = roster
            .employee(employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
        let profiles = self.workspace.load_profiles(tenant_id).await?;
        Ok(profile_view(employee, profiles.get(&employee.id)))
    }

    /// Admin edit of any employee's contact details.
    pub async fn update_employee_profile(
        &self,
        tenant_id: &Uuid,
        employee_id: &str,
        profile: EmployeeProfile,
    ) -> Result<ProfileView, DomainError> {
        self.write_profile(tenant_id, employee_id, profile, false).await
    }

    /// Self-service edit; deactivated employees are refused.
    pub async fn update_own_profile(
        &self,
        tenant_id: &Uuid,
        employee_id: &str,
        profile: EmployeeProfile,
    ) -> Result<ProfileView, DomainError> {
        self.write_profile(tenant_id, employee_id, profile, true).await
    }

    async fn write_profile(
        &self,
        tenant_id: &Uuid,
        employee_id: &str,
        profile: EmployeeProfile,
        require_active: bool,
    ) -> Result<ProfileView, DomainError> {
        let profile = profile.normalized()?;
        let _guard = self.locks.acquire(tenant_id).await;
        let roster = self.workspace.load_roster(tenant_id).await?;
        let employee = roster
            .employee(employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(employee_id.to_string()))?;
        if require_active && !employee.is_active() {
            return Err(DomainError::AccountNotActive);
        }

        let mut profiles = self.workspace.load_profiles(tenant_id).await?;
        profiles.set(&employee.id, profile.clone());
        self.workspace.save_profiles(tenant_id, &profiles).await?;
        info!("Profile updated for {}", employee.id);
        Ok(profile_view(employee, profile))
    }

    /// Moves the employee to the inactive team and locks their login.
    pub async fn deactivate_employee(&self, tenant_id: &Uuid, id: &str) -> Result<Employee, DomainError> {
        let employee = self
            .set_employee_state(tenant_id, id, CredentialStatus::Inactive, |roster| {
                roster.deactivate_employee(id, Utc::now()).cloned()
            })
            .await?;
        warn!("Employee {} deactivated", employee.id);
        Ok(employee)
    }

    pub async fn reactivate_employee(&self, tenant_id: &Uuid, id: &str, team: &str) -> Result<Employee, DomainError> {
        let employee = self
            .set_employee_state(tenant_id, id, CredentialStatus::Active, |roster| {
                roster.reactivate_employee(id, team).cloned()
            })
            .await?;
        info!("Employee {} reactivated into {}", employee.id, employee.team);
        Ok(employee)
    }

    /// Writes one cell. Returns the audit record when the value changed.
    pub async fn update_shift(
        &self,
        tenant_id: &Uuid,
        update: ShiftUpdate,
        actor: &str,
    ) -> Result<Option<Modification>, DomainError> {
        let settings = self.workspace.load_settings(tenant_id).await?;
        let code = settings.validate_shift(&update.shift)?;

        let _guard = self.locks.acquire(tenant_id).await;
        let mut roster = self.workspace.load_roster(tenant_id).await?;
        let Some(change) = roster.set_shift(&update.employee_id, update.date, &code)? else {
            return Ok(None);
        };
        let employee = roster
            .employee(&update.employee_id)
            .ok_or_else(|| DomainError::EmployeeNotFound(update.employee_id.clone()))?;
        let record = Modification::new(
            &employee.id,
            &employee.name,
            &employee.team,
            update.date,
            &change.old_shift,
            &change.new_shift,
            actor,
            Utc::now(),
        );

        self.workspace.save_roster(tenant_id, &roster).await?;
        let mut log = self.workspace.load_modifications(tenant_id).await?;
        log.append([record.clone()]);
        self.workspace.save_modifications(tenant_id, &log).await?;
        Ok(Some(record))
    }

    /// All-or-nothing: a single bad row aborts the import before any write.
    pub async fn import_csv(&self, tenant_id: &Uuid, input: &str) -> Result<ImportSummary, DomainError> {
        let settings = self.workspace.load_settings(tenant_id).await?;
        let rows = roster_csv::parse(input, &settings)?;

        let _guard = self.locks.acquire(tenant_id).await;
        let mut roster = self.workspace.load_roster(tenant_id).await?;
        let summary = roster_csv::apply(&mut roster, &rows)?;
        if !summary.is_noop() {
            self.workspace.save_roster(tenant_id, &roster).await?;
        }
        info!(
            "CSV import: {} rows, {} employees added, {} shifts changed",
            summary.rows, summary.employees_added, summary.shifts_changed
        );
        Ok(summary)
    }

    pub async fn export_csv(&self, tenant_id: &Uuid, months: &[String]) -> Result<String, DomainError> {
        if let Some(bad) = months.iter().find(|m| !is_valid_month_key(m)) {
            return Err(DomainError::ValidationError(format!("Invalid month '{}'", bad)));
        }
        let roster = self.workspace.load_roster(tenant_id).await?;
        roster_csv::export(&roster, months)
    }

    /// Defaults to the current month.
    pub async fn modifications(&self, tenant_id: &Uuid, month: Option<&str>) -> Result<ModificationOverview, DomainError> {
        let month = match month {
            Some(m) if is_valid_month_key(m) => m.to_string(),
            Some(m) => return Err(DomainError::ValidationError(format!("Invalid month '{}'", m))),
            None => current_month_key(Utc::now()),
        };
        let log = self.workspace.load_modifications(tenant_id).await?;
        Ok(log.overview(&month, RECENT_MODIFICATIONS_LIMIT))
    }

    pub async fn shift_definitions(&self, tenant_id: &Uuid) -> Result<BTreeMap<String, String>, DomainError> {
        Ok(self.workspace.load_settings(tenant_id).await?.shift_definitions())
    }

    pub async fn upsert_shift_definition(
        &self,
        tenant_id: &Uuid,
        code: &str,
        description: &str,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        self.mutate_settings(tenant_id, |s| s.upsert_shift(code, description))
            .await
            .map(|s| s.shift_definitions())
    }

    pub async fn delete_shift_definition(&self, tenant_id: &Uuid, code: &str) -> Result<BTreeMap<String, String>, DomainError> {
        self.mutate_settings(tenant_id, |s| s.remove_shift(code))
            .await
            .map(|s| s.shift_definitions())
    }

    pub async fn replace_shift_definitions(
        &self,
        tenant_id: &Uuid,
        definitions: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        self.mutate_settings(tenant_id, move |s| s.replace_shifts(definitions))
            .await
            .map(|s| s.shift_definitions())
    }

    pub async fn sheet_links(&self, tenant_id: &Uuid) -> Result<BTreeMap<String, String>, DomainError> {
        Ok(self.workspace.load_settings(tenant_id).await?.sheet_links)
    }

    pub async fn save_sheet_link(&self, tenant_id: &Uuid, month: &str, url: &str) -> Result<BTreeMap<String, String>, DomainError> {
        if !is_valid_month_key(month) {
            return Err(DomainError::ValidationError(format!("Invalid month '{}'", month)));
        }
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(DomainError::ValidationError("Sheet link must be an http(s) URL".into()));
        }
        self.mutate_settings(tenant_id, |s| {
            s.sheet_links.insert(month.to_string(), url.to_string());
            Ok(())
        })
        .await
        .map(|s| s.sheet_links)
    }

    pub async fn delete_sheet_link(&self, tenant_id: &Uuid, month: &str) -> Result<BTreeMap<String, String>, DomainError> {
        self.mutate_settings(tenant_id, |s| {
            s.sheet_links
                .remove(month)
                .map(|_| ())
                .ok_or_else(|| DomainError::SheetLinkNotFound(month.to_string()))
        })
        .await
        .map(|s| s.sheet_links)
    }

    /// Downloads the month's published sheet and imports it.
    pub async fn sync_sheet(&self, tenant_id: &Uuid, month: &str) -> Result<ImportSummary, DomainError> {
        let settings = self.workspace.load_settings(tenant_id).await?;
        let url = settings
            .sheet_links
            .get(month)
            .ok_or_else(|| DomainError::SheetLinkNotFound(month.to_string()))?;
        info!("Syncing sheet for {} from {}", month, url);
        let body = self.fetcher.fetch_csv(url).await?;
        self.import_csv(tenant_id, &body).await
    }

    async fn mutate_roster<F>(&self, tenant_id: &Uuid, change: F) -> Result<Roster, DomainError>
    where
        F: FnOnce(&mut Roster) -> Result<(), DomainError>,
    {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut roster = self.workspace.load_roster(tenant_id).await?;
        change(&mut roster)?;
        self.workspace.save_roster(tenant_id, &roster).await?;
        Ok(roster)
    }

    async fn mutate_settings<F>(&self, tenant_id: &Uuid, change: F) -> Result<WorkspaceSettings, DomainError>
    where
        F: FnOnce(&mut WorkspaceSettings) -> Result<(), DomainError>,
    {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut settings = self.workspace.load_settings(tenant_id).await?;
        change(&mut settings)?;
        self.workspace.save_settings(tenant_id, &settings).await?;
        Ok(settings)
    }

    async fn set_employee_state<F>(
        &self,
        tenant_id: &Uuid,
        id: &str,
        status: CredentialStatus,
        change: F,
    ) -> Result<Employee, DomainError>
    where
        F: FnOnce(&mut Roster) -> Result<Employee, DomainError>,
    {
        let _guard = self.locks.acquire(tenant_id).await;
        let mut roster = self.workspace.load_roster(tenant_id).await?;
        let employee = change(&mut roster)?;
        self.workspace.save_roster(tenant_id, &roster).await?;

        let mut credentials = self.workspace.load_credentials(tenant_id).await?;
        if let Some(credential) = find_credential_mut(&mut credentials, id) {
            credential.status = status;
            credential.updated_at = Some(Utc::now());
            self.workspace.save_credentials(tenant_id, &credentials).await?;
        }
        Ok(employee)
    }
}

fn profile_view(employee: &Employee, profile: EmployeeProfile) -> ProfileView {
    ProfileView {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        team: employee.team.clone(),
        profile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmployeeCredential, ModificationLog, ProfileBook, TenantSettings};
    use crate::ports::MockSheetFetcher;
    use crate::repositories::MockWorkspaceRepository;
    use std::sync::Mutex;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn roster() -> Roster {
        let mut roster = Roster::default();
        roster.add_team("Ward A").unwrap();
        roster.insert_date(day());
        roster.add_employee("E1", "Alice", "Ward A").unwrap();
        roster
    }

    fn service(workspace: MockWorkspaceRepository, fetcher: MockSheetFetcher) -> RosterService {
        RosterService::new(Arc::new(workspace), Arc::new(TenantLocks::new()), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_update_shift_records_modification() {
        let log: Arc<Mutex<ModificationLog>> = Arc::default();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_settings().returning(|_| Ok(WorkspaceSettings::default()));
        workspace.expect_load_roster().returning(|_| Ok(roster()));
        workspace.expect_save_roster().times(1).returning(|_, _| Ok(()));
        workspace.expect_load_modifications().returning(|_| Ok(ModificationLog::default()));
        let sink = log.clone();
        workspace.expect_save_modifications().returning(move |_, saved| {
            *sink.lock().unwrap() = saved.clone();
            Ok(())
        });

        let record = service(workspace, MockSheetFetcher::new())
            .update_shift(
                &Uuid::new_v4(),
                ShiftUpdate {
                    employee_id: "e1".into(),
                    date: day(),
                    shift: "m3".into(),
                },
                "boss",
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!((record.old_shift.as_str(), record.new_shift.as_str()), ("", "M3"));
        assert_eq!(record.employee_id, "E1");
        assert_eq!(log.lock().unwrap().records.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_shift_code_touches_nothing() {
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_settings().returning(|_| Ok(WorkspaceSettings::default()));
        workspace.expect_save_roster().never();

        let result = service(workspace, MockSheetFetcher::new())
            .update_shift(
                &Uuid::new_v4(),
                ShiftUpdate {
                    employee_id: "E1".into(),
                    date: day(),
                    shift: "XX".into(),
                },
                "boss",
            )
            .await;
        assert!(matches!(result, Err(DomainError::UnknownShiftCode(_))));
    }

    #[tokio::test]
    async fn test_add_employee_respects_limit_and_credentials() {
        let mut tenant = Tenant::new("Acme", "acme", TenantSettings::default()).unwrap();
        tenant.settings.max_employees = Some(1);
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| Ok(roster()));
        workspace
            .expect_load_credentials()
            .returning(|_| Ok(vec![EmployeeCredential::new("E2", Utc::now())]));
        workspace.expect_save_roster().never();
        let roster_service = service(workspace, MockSheetFetcher::new());

        let over_limit = roster_service
            .add_employee(&tenant, NewEmployee { id: "E3".into(), name: "Cara".into(), team: "Ward A".into() })
            .await;
        assert!(matches!(over_limit, Err(DomainError::EmployeeLimitReached(1))));

        tenant.settings.max_employees = None;
        let taken = roster_service
            .add_employee(&tenant, NewEmployee { id: "e2".into(), name: "Bo".into(), team: "Ward A".into() })
            .await;
        assert!(matches!(taken, Err(DomainError::EmployeeAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_bad_csv_row_writes_nothing() {
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_settings().returning(|_| Ok(WorkspaceSettings::default()));
        workspace.expect_save_roster().never();

        let result = service(workspace, MockSheetFetcher::new())
            .import_csv(&Uuid::new_v4(), "date,employee_id,name,team,shift\n2024-06-01,E1,A,T,M2\nnot-a-date,E1,A,T,M2\n")
            .await;
        assert!(matches!(result, Err(DomainError::CsvRow { row: 2, .. })));
    }

    #[tokio::test]
    async fn test_sync_sheet_fetches_linked_csv() {
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_settings().returning(|_| {
            let mut settings = WorkspaceSettings::default();
            settings
                .sheet_links
                .insert("2024-06".into(), "https://sheets.example.com/june.csv".into());
            Ok(settings)
        });
        workspace.expect_load_roster().returning(|_| Ok(Roster::default()));
        workspace.expect_save_roster().times(1).returning(|_, _| Ok(()));
        let mut fetcher = MockSheetFetcher::new();
        fetcher
            .expect_fetch_csv()
            .withf(|url| url == "https://sheets.example.com/june.csv")
            .returning(|_| Ok("date,id,name,team,shift\n2024-06-01,E9,Zed,Night,D2\n".into()));
        let roster_service = service(workspace, fetcher);

        let summary = roster_service.sync_sheet(&Uuid::new_v4(), "2024-06").await.unwrap();
        assert_eq!(summary.employees_added, 1);
        assert!(matches!(
            roster_service.sync_sheet(&Uuid::new_v4(), "2024-07").await,
            Err(DomainError::SheetLinkNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_profiles_are_validated_and_keyed_by_roster_id() {
        let book: Arc<Mutex<ProfileBook>> = Arc::default();
        let mut workspace = MockWorkspaceRepository::new();
        workspace.expect_load_roster().returning(|_| {
            let mut roster = roster();
            roster.add_employee("E2", "Bob", "Ward A").unwrap();
            roster.deactivate_employee("E2", Utc::now()).unwrap();
            Ok(roster)
        });
        let source = book.clone();
        workspace
            .expect_load_profiles()
            .returning(move |_| Ok(source.lock().unwrap().clone()));
        let sink = book.clone();
        workspace.expect_save_profiles().returning(move |_, saved| {
            *sink.lock().unwrap() = saved.clone();
            Ok(())
        });
        let roster_service = service(workspace, MockSheetFetcher::new());
        let tenant = Uuid::new_v4();

        let saved = roster_service
            .update_own_profile(
                &tenant,
                "e1",
                EmployeeProfile { phone: Some(" 555-0100 ".into()), ..EmployeeProfile::default() },
            )
            .await
            .unwrap();
        assert_eq!(saved.employee_id, "E1");
        assert_eq!(book.lock().unwrap().get("E1").phone.as_deref(), Some("555-0100"));
        assert_eq!(roster_service.employee_profile(&tenant, "E1").await.unwrap().profile.phone.as_deref(), Some("555-0100"));

        let bad_email = roster_service
            .update_employee_profile(
                &tenant,
                "E1",
                EmployeeProfile { email: Some("nope".into()), ..EmployeeProfile::default() },
            )
            .await;
        assert!(matches!(bad_email, Err(DomainError::ValidationError(_))));

        let inactive = roster_service
            .update_own_profile(&tenant, "E2", EmployeeProfile::default())
            .await;
        assert!(matches!(inactive, Err(DomainError::AccountNotActive)));
        assert!(roster_service
            .update_employee_profile(&tenant, "E2", EmployeeProfile::default())
            .await
            .is_ok());
    }
}
