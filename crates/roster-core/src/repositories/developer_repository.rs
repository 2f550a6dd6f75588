//! Developer account repository trait (port)

use async_trait::async_trait;
use crate::domain::DeveloperUser;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeveloperRepository: Send + Sync {
    async fn count(&self) -> Result<usize, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<DeveloperUser>, DomainError>;
    async fn create(&self, developer: &DeveloperUser) -> Result<DeveloperUser, DomainError>;
}
