//! # Roster Security
//! 
//! Security utilities: session JWTs, cookies, password hashing, reset tokens.

pub mod jwt;
pub mod password;
pub mod session;
pub mod token;

pub use jwt::{JwtError, JwtService, SessionClaims, SessionRole};
pub use password::{PasswordError, PasswordService};
