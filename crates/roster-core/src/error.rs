//! Domain errors

use chrono::NaiveDate;
use thiserror::Error;

use roster_security::PasswordError;

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant slug already exists: {0}")]
    TenantSlugAlreadyExists(String),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Employee id already exists: {0}")]
    EmployeeAlreadyExists(String),

    #[error("Employee not active: {0}")]
    EmployeeNotActive(String),

    #[error("Employee limit reached ({0})")]
    EmployeeLimitReached(u32),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Team already exists: {0}")]
    TeamAlreadyExists(String),

    #[error("Date not in roster: {0}")]
    DateNotInRoster(NaiveDate),

    #[error("Unknown shift code: {0}")]
    UnknownShiftCode(String),

    #[error("Shift definition not found: {0}")]
    ShiftDefinitionNotFound(String),

    #[error("No sheet link for month {0}")]
    SheetLinkNotFound(String),

    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("Request already resolved: {0}")]
    RequestAlreadyResolved(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not active")]
    AccountNotActive,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password too weak")]
    PasswordTooWeak,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("CSV row {row}: {message}")]
    CsvRow { row: usize, message: String },

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Sheet fetch error: {0}")]
    SheetFetchError(String),

    #[error("Mail error: {0}")]
    MailError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::TenantNotFound
            | DomainError::EmployeeNotFound(_)
            | DomainError::TeamNotFound(_)
            | DomainError::DateNotInRoster(_)
            | DomainError::ShiftDefinitionNotFound(_)
            | DomainError::SheetLinkNotFound(_)
            | DomainError::RequestNotFound(_) => ErrorKind::NotFound,

            DomainError::TenantSlugAlreadyExists(_)
            | DomainError::EmployeeAlreadyExists(_)
            | DomainError::TeamAlreadyExists(_)
            | DomainError::RequestAlreadyResolved(_)
            | DomainError::UserAlreadyExists(_) => ErrorKind::Conflict,

            DomainError::InvalidCredentials
            | DomainError::AccountNotActive
            | DomainError::Unauthorized
            | DomainError::InvalidToken => ErrorKind::Unauthorized,

            DomainError::EmployeeNotActive(_)
            | DomainError::EmployeeLimitReached(_)
            | DomainError::UnknownShiftCode(_)
            | DomainError::PasswordTooShort
            | DomainError::PasswordTooLong
            | DomainError::PasswordTooWeak
            | DomainError::CsvRow { .. }
            | DomainError::CsvError(_)
            | DomainError::ValidationError(_) => ErrorKind::Validation,

            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::SheetFetchError(_)
            | DomainError::MailError(_)
            | DomainError::StorageError(_)
            | DomainError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<PasswordError> for DomainError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => DomainError::PasswordTooShort,
            PasswordError::TooLong => DomainError::PasswordTooLong,
            PasswordError::TooWeak => DomainError::PasswordTooWeak,
            PasswordError::VerificationFailed => DomainError::InvalidCredentials,
            PasswordError::HashError(msg) => DomainError::PasswordHashError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(e: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(DomainError::TenantNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::RequestAlreadyResolved("swap_1".into()).kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::InvalidToken.kind(), ErrorKind::Unauthorized);
        assert_eq!(DomainError::CsvRow { row: 3, message: "bad date".into() }.kind(), ErrorKind::Validation);
        assert_eq!(DomainError::StorageError("disk".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_password_error_mapping() {
        assert!(matches!(DomainError::from(PasswordError::TooWeak), DomainError::PasswordTooWeak));
    }
}
