//! Outbound ports: published-sheet download and e-mail delivery

pub mod sheet_fetcher;
pub mod mailer;

pub use sheet_fetcher::SheetFetcher;
pub use mailer::{Mailer, PasswordLinkMail};

#[cfg(test)]
pub use sheet_fetcher::MockSheetFetcher;
#[cfg(test)]
pub use mailer::MockMailer;
