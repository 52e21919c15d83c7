//! Request and response types seen by middleware

use std::collections::HashMap;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Identity;

/// An HTTP-style request
#[derive(Debug, Clone)]
pub struct Request {
    /// Request ID for log correlation
    pub request_id: Uuid,

    /// Header names are stored lowercased
    headers: HashMap<String, String>,

    /// Decoded request body
    pub body: Value,

    /// Set by authentication middleware
    pub identity: Option<Identity>,
}

impl Request {
    pub fn new(body: Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            headers: HashMap::new(),
            body,
            identity: None,
        }
    }

    /// Adds a header; names are case-insensitive
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Convenience for `Authorization: Bearer <token>`
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

/// A terminal response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Error body: `{"error": code, "message": ...}` plus optional details
    pub fn error(status: u16, code: &str, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": code, "message": message.into() }))
    }

    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        Self::error(401, code, message)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
