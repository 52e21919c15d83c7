//! Discriminated validation result

use serde::Serialize;
use serde_json::Value;

use super::errors::{FieldError, ValidationError};

/// Outcome of a non-throwing validation call.
///
/// Serializes as `{"status": "ok", "value": ...}` or
/// `{"status": "fail", "errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Ok { value: Value },
    Fail { errors: ValidationError },
}

impl ValidationResult {
    pub(crate) fn ok(value: Value) -> Self {
        ValidationResult::Ok { value }
    }

    /// Engine failures always carry at least one error
    pub(crate) fn fail(errors: Vec<FieldError>) -> Self {
        ValidationResult::Fail {
            errors: ValidationError::from_engine(errors),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok { .. })
    }

    pub fn is_fail(&self) -> bool {
        !self.is_ok()
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ValidationResult::Ok { value } => Some(value),
            ValidationResult::Fail { .. } => None,
        }
    }

    /// Failures in report order; empty on success
    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Ok { .. } => &[],
            ValidationResult::Fail { errors } => errors.errors(),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self {
            ValidationResult::Ok { value } => Ok(value),
            ValidationResult::Fail { errors } => Err(errors),
        }
    }
}

impl From<ValidationResult> for Result<Value, ValidationError> {
    fn from(result: ValidationResult) -> Self {
        result.into_result()
    }
}
