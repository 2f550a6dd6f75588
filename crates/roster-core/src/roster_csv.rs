// ============================================================================
// Roster Core - CSV Codec
// File: crates/roster-core/src/roster_csv.rs
// Description: Long-format roster CSV (one row per employee and day)
// ============================================================================

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;

use roster_shared::constants::UNASSIGNED_TEAM;
use roster_shared::month_key;

use crate::domain::{Roster, WorkspaceSettings};
use crate::error::DomainError;

pub const CSV_HEADER: [&str; 5] = ["date", "employee_id", "name", "team", "shift"];

/// One validated data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based data row number, for error messages.
    pub row: usize,
    pub date: NaiveDate,
    pub employee_id: String,
    pub name: String,
    pub team: String,
    pub shift: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub employees_added: usize,
    pub employees_updated: usize,
    pub dates_added: usize,
    pub shifts_changed: usize,
}

impl ImportSummary {
    pub fn is_noop(&self) -> bool {
        self.employees_added == 0 && self.employees_updated == 0 && self.dates_added == 0 && self.shifts_changed == 0
    }
}

struct Columns {
    date: usize,
    employee_id: usize,
    name: usize,
    team: usize,
    shift: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, DomainError> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| DomainError::CsvError(format!("Missing column '{}'", names[0])))
        };
        Ok(Self {
            date: require(&["date"])?,
            employee_id: require(&["employee_id", "id"])?,
            name: require(&["name"])?,
            team: require(&["team"])?,
            shift: require(&["shift", "shift_code"])?,
        })
    }
}

/// Accepts `YYYY-MM-DD` and `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Parses and validates the whole document. Row numbers in errors are
/// 1-based and count data rows only.
pub fn parse(input: &str, settings: &WorkspaceSettings) -> Result<Vec<CsvRow>, DomainError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input.trim_start_matches('\u{feff}').as_bytes());

    let header = reader.headers().map_err(|e| DomainError::CsvError(e.to_string()))?.clone();
    let columns = Columns::from_header(&header)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|e| DomainError::CsvRow { row, message: e.to_string() })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |column: usize, name: &str| {
            record
                .get(column)
                .map(str::to_string)
                .ok_or_else(|| DomainError::CsvRow { row, message: format!("missing '{}'", name) })
        };

        let raw_date = field(columns.date, "date")?;
        let date = parse_date(&raw_date).ok_or_else(|| DomainError::CsvRow {
            row,
            message: format!("invalid date '{}'", raw_date),
        })?;
        let employee_id = field(columns.employee_id, "employee_id")?;
        if employee_id.is_empty() {
            return Err(DomainError::CsvRow { row, message: "empty employee_id".into() });
        }
        let shift = settings
            .validate_shift(&field(columns.shift, "shift")?)
            .map_err(|e| DomainError::CsvRow { row, message: e.to_string() })?;

        rows.push(CsvRow {
            row,
            date,
            employee_id,
            name: field(columns.name, "name")?,
            team: field(columns.team, "team")?,
            shift,
        });
    }
    Ok(rows)
}

/// Applies parsed rows: upserts employees, adds missing dates, writes cells.
/// Applying the same rows twice changes nothing the second time. On error
/// the roster is partially updated and must be discarded.
pub fn apply(roster: &mut Roster, rows: &[CsvRow]) -> Result<ImportSummary, DomainError> {
    let mut summary = ImportSummary {
        rows: rows.len(),
        ..ImportSummary::default()
    };
    for row in rows {
        apply_row(roster, row, &mut summary).map_err(|e| DomainError::CsvRow {
            row: row.row,
            message: e.to_string(),
        })?;
    }
    Ok(summary)
}

fn apply_row(roster: &mut Roster, row: &CsvRow, summary: &mut ImportSummary) -> Result<(), DomainError> {
    let team = if row.team.is_empty() { UNASSIGNED_TEAM } else { row.team.as_str() };

    if roster.date_index(row.date).is_none() {
        roster.insert_date(row.date);
        summary.dates_added += 1;
    }

    match roster.employee(&row.employee_id) {
        None => {
            ensure_team(roster, team)?;
            let name = if row.name.is_empty() { &row.employee_id } else { &row.name };
            roster.add_employee(&row.employee_id, name, team)?;
            summary.employees_added += 1;
        }
        Some(existing) => {
            let rename = !row.name.is_empty() && existing.name != row.name;
            let move_team = existing.is_active() && existing.team != team;
            if rename || move_team {
                if move_team {
                    ensure_team(roster, team)?;
                }
                roster.edit_employee(
                    &row.employee_id,
                    None,
                    rename.then_some(row.name.as_str()),
                    move_team.then_some(team),
                )?;
                summary.employees_updated += 1;
            }
        }
    }

    if roster.set_shift(&row.employee_id, row.date, &row.shift)?.is_some() {
        summary.shifts_changed += 1;
    }
    Ok(())
}

fn ensure_team(roster: &mut Roster, team: &str) -> Result<(), DomainError> {
    if roster.has_team(team) {
        Ok(())
    } else {
        roster.add_team(team)
    }
}

/// Writes the roster in import format. An empty `months` list exports
/// every date.
pub fn export(roster: &Roster, months: &[String]) -> Result<String, DomainError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| DomainError::CsvError(e.to_string()))?;

    for (index, date) in roster.dates.iter().enumerate() {
        if !months.is_empty() && !months.contains(&month_key(*date)) {
            continue;
        }
        let day = date.format("%Y-%m-%d").to_string();
        for employee in &roster.employees {
            let shift = employee.schedule.get(index).map(String::as_str).unwrap_or("");
            writer
                .write_record([day.as_str(), employee.id.as_str(), employee.name.as_str(), employee.team.as_str(), shift])
                .map_err(|e| DomainError::CsvError(e.to_string()))?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| DomainError::CsvError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::CsvError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Employee_ID,Name,Team,Shift
2024-06-01,E1,Alice,Ward A,M2
2024-06-01,E2,Bob,Ward B,do
02/06/2024,E1,Alice,Ward A,
";

    fn import(roster: &mut Roster, input: &str) -> Result<ImportSummary, DomainError> {
        let rows = parse(input, &WorkspaceSettings::default())?;
        apply(roster, &rows)
    }

    #[test]
    fn test_import_builds_roster() {
        let mut roster = Roster::default();
        let summary = import(&mut roster, SAMPLE).unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.employees_added, 2);
        assert_eq!(summary.dates_added, 2);
        assert_eq!(summary.shifts_changed, 2);
        assert_eq!(roster.teams, vec!["Ward A", "Ward B"]);
        let day1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(roster.shift_on("E2", day1).unwrap(), "DO");
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let mut roster = Roster::default();
        import(&mut roster, SAMPLE).unwrap();
        let before = roster.clone();

        let summary = import(&mut roster, SAMPLE).unwrap();
        assert!(summary.is_noop());
        assert_eq!(roster, before);
    }

    #[test]
    fn test_export_reimports_unchanged() {
        let mut roster = Roster::default();
        import(&mut roster, SAMPLE).unwrap();
        let exported = export(&roster, &[]).unwrap();
        assert!(exported.starts_with("date,employee_id,name,team,shift\n"));

        let mut copy = Roster::default();
        import(&mut copy, &exported).unwrap();
        assert_eq!(copy, roster);
        assert!(import(&mut roster, &exported).unwrap().is_noop());
    }

    #[test]
    fn test_export_month_filter() {
        let mut roster = Roster::default();
        import(&mut roster, "date,id,name,team,shift_code\n2024-06-30,E1,A,T,M2\n2024-07-01,E1,A,T,M3\n").unwrap();
        let exported = export(&roster, &["2024-07".to_string()]).unwrap();
        assert_eq!(exported.lines().count(), 2);
        assert!(exported.contains("2024-07-01"));
    }

    #[test]
    fn test_row_errors_name_the_row() {
        let settings = WorkspaceSettings::default();
        let bad_date = "date,employee_id,name,team,shift\n2024-06-01,E1,A,T,M2\n31/31/2024,E1,A,T,M2\n";
        assert!(matches!(parse(bad_date, &settings), Err(DomainError::CsvRow { row: 2, .. })));

        let bad_code = "date,employee_id,name,team,shift\n2024-06-01,E1,A,T,ZZ\n";
        assert!(matches!(parse(bad_code, &settings), Err(DomainError::CsvRow { row: 1, .. })));

        let empty_id = "date,employee_id,name,team,shift\n2024-06-01,,A,T,M2\n";
        assert!(matches!(parse(empty_id, &settings), Err(DomainError::CsvRow { row: 1, .. })));

        let short = "date,employee_id,name,team,shift\n2024-06-01,E1\n";
        assert!(matches!(parse(short, &settings), Err(DomainError::CsvRow { row: 1, .. })));

        let no_shift = "date,employee_id,name,team\n";
        assert!(matches!(parse(no_shift, &settings), Err(DomainError::CsvError(_))));
    }

    #[test]
    fn test_rows_that_cannot_be_applied_fail_with_their_number() {
        let long_team = "T".repeat(101);
        let mut roster = Roster::default();
        let added = import(
            &mut roster,
            &format!("date,id,name,team,shift\n2024-06-01,E1,Ann,Ward A,M2\n2024-06-01,E2,Ben,{},M2\n", long_team),
        );
        assert!(matches!(added, Err(DomainError::CsvRow { row: 2, .. })));

        let mut roster = Roster::default();
        import(&mut roster, "date,id,name,team,shift\n2024-06-01,E1,Ann,Ward A,M2\n").unwrap();
        let moved = import(&mut roster, &format!("date,id,name,team,shift\n2024-06-01,E1,Ann,{},M2\n", long_team));
        assert!(matches!(moved, Err(DomainError::CsvRow { row: 1, .. })));
    }
}
