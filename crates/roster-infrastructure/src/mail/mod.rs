//! Password-link e-mail delivery

pub mod smtp_mailer;
pub mod log_mailer;
pub mod templates;

pub use smtp_mailer::{MailSetupError, SmtpMailer};
pub use log_mailer::LogMailer;
