//! # Roster API
//!
//! HTTP handlers, extractors, DTOs and the router for the roster service.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, Backends};
