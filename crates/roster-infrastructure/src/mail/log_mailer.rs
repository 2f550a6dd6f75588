use async_trait::async_trait;
use tracing::info;

use roster_core::error::DomainError;
use roster_core::ports::{Mailer, PasswordLinkMail};
use roster_shared::utils::mask_email;

/// Used when SMTP is disabled: the link is only logged.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_link(&self, mail: &PasswordLinkMail) -> Result<(), DomainError> {
        info!(
            to = %mask_email(&mail.to),
            organization = %mail.organization,
            "Mail delivery disabled; password link issued for {}",
            mail.employee_name
        );
        Ok(())
    }
}
