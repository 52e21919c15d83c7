//! Validation engine and result adapters
//!
//! `safe_parse` always returns a [`ValidationResult`]; `parse` turns a
//! failure into a single [`ValidationError`] carrying every field error.
//! Both are thin adapters over the same pure engine.
//!
//! # Usage
//!
//! ```ignore
//! use schemaguard::schema::Schema;
//! use schemaguard::validation::safe_parse;
//!
//! let age = Schema::number().integer().min(18.0).max(120.0).build()?;
//! let result = safe_parse(&age, &serde_json::json!(15));
//! assert!(result.is_fail());
//! ```

mod clock;
mod engine;
mod errors;
mod result;

pub use clock::{Clock, DefaultClock, FixedClock, SharedClock};
pub use engine::Validator;
pub use errors::{ErrorCode, FieldError, FieldPath, PathSegment, ValidationError};
pub use result::ValidationResult;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::Schema;

/// Non-throwing validation with the system clock
pub fn safe_parse(schema: &Schema, input: &Value) -> ValidationResult {
    Validator::new().safe_parse(schema, input)
}

/// Throwing validation with the system clock
pub fn parse(schema: &Schema, input: &Value) -> Result<Value, ValidationError> {
    Validator::new().parse(schema, input)
}

/// Validation followed by deserialization into `T`
pub fn parse_as<T: DeserializeOwned>(schema: &Schema, input: &Value) -> Result<T, ValidationError> {
    Validator::new().parse_as(schema, input)
}

impl Schema {
    /// See [`parse`]
    pub fn parse(&self, input: &Value) -> Result<Value, ValidationError> {
        parse(self, input)
    }

    /// See [`safe_parse`]
    pub fn safe_parse(&self, input: &Value) -> ValidationResult {
        safe_parse(self, input)
    }

    /// See [`parse_as`]
    pub fn parse_as<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationError> {
        parse_as(self, input)
    }
}
