//! Application-wide constants

pub const DEVELOPER_SESSION_COOKIE: &str = "roster_developer_session";
pub const ADMIN_SESSION_COOKIE: &str = "roster_admin_session";
pub const EMPLOYEE_SESSION_COOKIE: &str = "roster_employee_session";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 8 * 60 * 60;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_PASSWORD_SCORE: u8 = 2;
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

pub const UNASSIGNED_TEAM: &str = "Unassigned";
pub const INACTIVE_TEAM: &str = "Inactive Employees";

/// Host labels that never name a tenant.
pub const RESERVED_SUBDOMAINS: [&str; 4] = ["www", "api", "admin", "developer"];

pub const RECENT_MODIFICATIONS_LIMIT: usize = 50;

/// Built-in shift table used until a tenant defines its own.
pub const DEFAULT_SHIFT_DEFINITIONS: [(&str, &str); 10] = [
    ("M2", "8 AM – 5 PM"),
    ("M3", "9 AM – 6 PM"),
    ("M4", "10 AM – 7 PM"),
    ("D1", "12 PM – 9 PM"),
    ("D2", "1 PM – 10 PM"),
    ("DO", "OFF"),
    ("SL", "Sick Leave"),
    ("CL", "Casual Leave"),
    ("EL", "Emergency Leave"),
    ("HL", "Holiday Leave"),
];
