//! Repository traits (ports)

pub mod tenant_repository;
pub mod developer_repository;
pub mod workspace_repository;

pub use tenant_repository::TenantRepository;
pub use developer_repository::DeveloperRepository;
pub use workspace_repository::WorkspaceRepository;

#[cfg(test)]
pub use tenant_repository::MockTenantRepository;
#[cfg(test)]
pub use developer_repository::MockDeveloperRepository;
#[cfg(test)]
pub use workspace_repository::MockWorkspaceRepository;
