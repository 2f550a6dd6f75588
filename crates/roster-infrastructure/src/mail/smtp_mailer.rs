// ============================================================================
// Roster Infrastructure - SMTP Mailer
// File: crates/roster-infrastructure/src/mail/smtp_mailer.rs
// ============================================================================

use async_trait::async_trait;
use handlebars::Handlebars;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{error, info};

use roster_core::error::DomainError;
use roster_core::ports::{Mailer, PasswordLinkMail};
use roster_shared::config::MailSettings;
use roster_shared::constants::RESET_TOKEN_TTL_HOURS;
use roster_shared::utils::mask_email;

use super::templates;

#[derive(Debug, Error)]
pub enum MailSetupError {
    #[error("invalid sender address: {0}")]
    InvalidSender(#[from] lettre::address::AddressError),

    #[error("smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail templates: {0}")]
    Template(#[from] handlebars::TemplateError),
}

/// Delivers password links over SMTP with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    templates: Handlebars<'static>,
}

impl SmtpMailer {
    pub fn from_settings(settings: &MailSettings) -> Result<Self, MailSetupError> {
        let from: Mailbox = settings.from_address.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            .port(settings.smtp_port);
        if !settings.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.smtp_username.clone(),
                settings.smtp_password.clone(),
            ));
        }

        info!("SMTP relay {}:{}", settings.smtp_host, settings.smtp_port);
        Ok(Self {
            transport: builder.build(),
            from,
            templates: templates::registry()?,
        })
    }

    fn build_message(&self, mail: &PasswordLinkMail) -> Result<Message, DomainError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| DomainError::MailError(format!("invalid recipient: {}", e)))?;
        let (subject, html) = templates::render_password_link(&self.templates, mail, RESET_TOKEN_TTL_HOURS)
            .map_err(|e| DomainError::MailError(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| DomainError::MailError(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_link(&self, mail: &PasswordLinkMail) -> Result<(), DomainError> {
        let message = self.build_message(mail)?;
        match self.transport.send(message).await {
            Ok(_) => {
                info!(to = %mask_email(&mail.to), "Password link sent");
                Ok(())
            }
            Err(e) => {
                error!(to = %mask_email(&mail.to), "SMTP delivery failed: {}", e);
                Err(DomainError::MailError(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MailSettings {
        MailSettings {
            enabled: true,
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_username: "roster".into(),
            smtp_password: "secret".into(),
            from_address: "Roster <noreply@example.com>".into(),
            reset_link_base: "https://roster.example.com".into(),
        }
    }

    #[test]
    fn test_rejects_bad_sender() {
        let mut bad = settings();
        bad.from_address = "not an address".into();
        assert!(matches!(SmtpMailer::from_settings(&bad), Err(MailSetupError::InvalidSender(_))));
    }

    #[tokio::test]
    async fn test_builds_html_message() {
        let mailer = SmtpMailer::from_settings(&settings()).unwrap();
        let mail = PasswordLinkMail {
            to: "ann@example.com".into(),
            employee_name: "Ann".into(),
            organization: "Acme".into(),
            link: "https://roster.example.com/t/acme/set-password?token=abc".into(),
        };
        let message = mailer.build_message(&mail).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Acme: set your roster password"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_rejects_bad_recipient() {
        let mailer = SmtpMailer::from_settings(&settings()).unwrap();
        let mail = PasswordLinkMail {
            to: "nope".into(),
            employee_name: "Ann".into(),
            organization: "Acme".into(),
            link: "https://x".into(),
        };
        assert!(matches!(mailer.build_message(&mail), Err(DomainError::MailError(_))));
    }
}
