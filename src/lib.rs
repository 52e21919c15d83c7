//! schemaguard - composable schema validation for untyped JSON payloads
//!
//! - `schema`: schema nodes, builders, combinators and schema files
//! - `validation`: the validation engine and its two calling modes
//! - `auth` / `middleware`: bearer-token verification in front of handlers

pub mod auth;
pub mod cli;
pub mod config;
pub mod middleware;
pub mod observability;
pub mod schema;
pub mod validation;
