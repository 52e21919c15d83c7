//! Field-level validation failures
//!
//! Every failure carries a path from the root of the input to the
//! offending location, a human-readable message and a stable code.
//!
//! Codes:
//! - type_mismatch
//! - constraint_violation
//! - unrecognized_key
//! - refinement_failed

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category for a single field error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Runtime shape differs from the expected kind
    TypeMismatch,
    /// Right shape, but a length/range/pattern/membership check failed
    ConstraintViolation,
    /// Strict object received an undeclared key
    UnrecognizedKey,
    /// Structurally valid value failed a refinement predicate
    RefinementFailed,
}

impl ErrorCode {
    /// Returns the wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TypeMismatch => "type_mismatch",
            ErrorCode::ConstraintViolation => "constraint_violation",
            ErrorCode::UnrecognizedKey => "unrecognized_key",
            ErrorCode::RefinementFailed => "refinement_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step in a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered location of a value inside the input.
///
/// Serializes as a JSON array (`["items", 2, "name"]`) and displays as a
/// dotted path (`items[2].name`). The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The root path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `segment` appended
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Returns a new path with every segment of `suffix` appended
    pub fn join(&self, suffix: &FieldPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, if any
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$root");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
            }
        }
        Ok(())
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the offending value
    pub path: FieldPath,
    /// Human-readable description
    pub message: String,
    /// Failure category
    pub code: ErrorCode,
}

impl FieldError {
    pub fn new(path: FieldPath, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code,
        }
    }

    pub fn type_mismatch(path: &FieldPath, expected: &str, received: &str) -> Self {
        Self::new(
            path.clone(),
            ErrorCode::TypeMismatch,
            format!("Expected {}, received {}", expected, received),
        )
    }

    /// Required value was absent
    pub fn required(path: &FieldPath) -> Self {
        Self::new(path.clone(), ErrorCode::TypeMismatch, "Required")
    }

    pub fn constraint(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::new(path.clone(), ErrorCode::ConstraintViolation, message)
    }

    pub fn unrecognized_key(path: &FieldPath, key: &str) -> Self {
        Self::new(
            path.child(key),
            ErrorCode::UnrecognizedKey,
            format!("Unrecognized key '{}'", key),
        )
    }

    pub fn refinement(path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(path, ErrorCode::RefinementFailed, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.code)
    }
}

/// Aggregate failure raised by [`parse`](crate::validation::parse).
///
/// Always carries the complete, ordered list of failures. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed with {} error(s): {}", .errors.len(), render(&.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Wraps a failure list. Returns `None` when `errors` is empty.
    pub fn new(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Wraps an engine failure list. An empty list is an engine bug.
    pub(crate) fn from_engine(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty(), "a failure must carry at least one error");
        Self { errors }
    }

    /// A single root-level error
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Failures whose path ends at the named field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| {
            matches!(e.path.last(), Some(PathSegment::Key(k)) if k == field)
        })
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::root().child("items").child(2usize).child("name");
        assert_eq!(path.to_string(), "items[2].name");
        assert_eq!(FieldPath::root().to_string(), "$root");
    }

    #[test]
    fn test_path_serializes_as_array() {
        let path = FieldPath::root().child("tags").child(0usize);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["tags", 0]));
    }

    #[test]
    fn test_codes_are_snake_case_on_the_wire() {
        let err = FieldError::constraint(&FieldPath::root().child("age"), "too small");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "constraint_violation");
        assert_eq!(json["path"], serde_json::json!(["age"]));
    }

    #[test]
    fn test_unrecognized_key_points_at_key() {
        let err = FieldError::unrecognized_key(&FieldPath::root().child("user"), "extra");
        assert_eq!(err.path.to_string(), "user.extra");
        assert_eq!(err.code, ErrorCode::UnrecognizedKey);
    }

    #[test]
    fn test_validation_error_never_empty() {
        assert!(ValidationError::new(Vec::new()).is_none());
    }

    #[test]
    fn test_validation_error_display_lists_all() {
        let err = ValidationError::new(vec![
            FieldError::required(&FieldPath::root().child("email")),
            FieldError::constraint(&FieldPath::root().child("age"), "Must be at least 18"),
        ])
        .unwrap();

        let display = err.to_string();
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("email"));
        assert!(display.contains("Must be at least 18"));
    }
}
