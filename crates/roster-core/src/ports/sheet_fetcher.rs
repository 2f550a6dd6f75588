use async_trait::async_trait;
use crate::error::DomainError;

/// Downloads a published spreadsheet as CSV text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetFetcher: Send + Sync {
    async fn fetch_csv(&self, url: &str) -> Result<String, DomainError>;
}
