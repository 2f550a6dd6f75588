//! Session token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use roster_shared::constants::{ADMIN_SESSION_COOKIE, DEVELOPER_SESSION_COOKIE, EMPLOYEE_SESSION_COOKIE};

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token issued for role {actual}, expected {expected}")]
    RoleMismatch { expected: SessionRole, actual: SessionRole },
    #[error("Token issued for another tenant")]
    TenantMismatch,
}

/// The three credential stores a session can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Developer,
    Admin,
    Employee,
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRole::Developer => "developer",
            SessionRole::Admin => "admin",
            SessionRole::Employee => "employee",
        }
    }

    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionRole::Developer => DEVELOPER_SESSION_COOKIE,
            SessionRole::Admin => ADMIN_SESSION_COOKIE,
            SessionRole::Employee => EMPLOYEE_SESSION_COOKIE,
        }
    }
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: SessionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: i64,
}

impl JwtService {
    pub fn new(secret: &str, session_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> i64 {
        self.session_ttl
    }

    pub fn issue(&self, subject: &str, role: SessionRole, tenant_id: Option<Uuid>) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            role,
            tenant_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.session_ttl)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }

    /// Validates the token and checks it belongs to `role` and, for
    /// tenant-scoped roles, to `tenant_id`.
    pub fn validate_scoped(
        &self,
        token: &str,
        role: SessionRole,
        tenant_id: Option<Uuid>,
    ) -> Result<SessionClaims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.role != role {
            return Err(JwtError::RoleMismatch { expected: role, actual: claims.role });
        }
        if claims.tenant_id != tenant_id {
            return Err(JwtError::TenantMismatch);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = service();
        let tenant = Uuid::new_v4();
        let token = jwt.issue("alice", SessionRole::Admin, Some(tenant)).unwrap();

        let claims = jwt.validate_scoped(&token, SessionRole::Admin, Some(tenant)).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, SessionRole::Admin);
    }

    #[test]
    fn test_role_mismatch_rejected() {
        let jwt = service();
        let tenant = Uuid::new_v4();
        let token = jwt.issue("E-100", SessionRole::Employee, Some(tenant)).unwrap();

        let err = jwt.validate_scoped(&token, SessionRole::Admin, Some(tenant)).unwrap_err();
        assert!(matches!(err, JwtError::RoleMismatch { .. }));
    }

    #[test]
    fn test_tenant_mismatch_rejected() {
        let jwt = service();
        let token = jwt.issue("alice", SessionRole::Admin, Some(Uuid::new_v4())).unwrap();

        let err = jwt.validate_scoped(&token, SessionRole::Admin, Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, JwtError::TenantMismatch));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = JwtService::new("other-secret", 3600)
            .issue("mallory", SessionRole::Developer, None)
            .unwrap();

        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway.
        let jwt = JwtService::new("test-secret", -120);
        let token = jwt.issue("alice", SessionRole::Developer, None).unwrap();

        assert!(matches!(jwt.validate_token(&token), Err(JwtError::TokenExpired)));
    }
}
