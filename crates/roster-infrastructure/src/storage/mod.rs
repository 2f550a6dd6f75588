//! JSON-file storage adapter

pub mod layout;
pub mod json_store;

pub use layout::{DataLayout, TenantDocument};
pub use json_store::JsonFileStore;
