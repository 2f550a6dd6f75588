//! # Roster Core
//!
//! Domain entities, services, ports and repository traits for the roster service.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod ports;
pub mod resolver;
pub mod roster_csv;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
