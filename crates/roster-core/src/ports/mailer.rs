use async_trait::async_trait;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordLinkMail {
    pub to: String,
    pub employee_name: String,
    pub organization: String,
    pub link: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_link(&self, mail: &PasswordLinkMail) -> Result<(), DomainError>;
}
