//! # Roster Infrastructure
//!
//! Adapters: JSON-file storage, published-sheet download, e-mail delivery.

pub mod storage;
pub mod sheets;
pub mod mail;

pub use storage::{DataLayout, JsonFileStore, TenantDocument};
pub use sheets::HttpSheetFetcher;
pub use mail::{LogMailer, MailSetupError, SmtpMailer};
