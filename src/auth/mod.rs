//! # Authentication
//!
//! Stateless bearer-token verification against a shared secret.
//! The secret is passed in through [`TokenConfig`]; nothing here reads
//! process-wide state.

mod config;
mod errors;
mod jwt;

pub use config::TokenConfig;
pub use errors::{AuthError, AuthResult};
pub use jwt::{Claims, Identity, JwtVerifier};
