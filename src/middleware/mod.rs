//! # Request Middleware
//!
//! A small async pipeline: requests pass through ordered middleware
//! stages and end at a handler. [`TokenAuth`] is the bearer-token stage.

mod auth;
mod pipeline;
mod request;

pub use auth::{extract_bearer, TokenAuth};
pub use pipeline::{BoxFuture, FnHandler, Handler, Middleware, Next, Pipeline};
pub use request::{Request, Response};
