//! Schema construction errors
//!
//! A schema that contradicts itself (empty enum, min above max, bad
//! regex) is rejected when it is built. These errors are configuration
//! faults and are never reported as per-field validation failures.
//!
//! Error codes:
//! - SCHEMA_MISCONFIGURATION (FATAL)
//! - SCHEMA_FILE_INVALID (FATAL)
//! - SCHEMA_DUPLICATE (FATAL)

use std::fmt;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Contradictory or invalid constraints
    Misconfiguration,
    /// Schema file could not be read or parsed
    FileInvalid,
    /// Schema name registered twice
    Duplicate,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::Misconfiguration => "SCHEMA_MISCONFIGURATION",
            SchemaErrorCode::FileInvalid => "SCHEMA_FILE_INVALID",
            SchemaErrorCode::Duplicate => "SCHEMA_DUPLICATE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Source file, when the schema came from disk
    origin: Option<String>,
}

impl SchemaError {
    /// Contradictory or invalid constraint
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::Misconfiguration,
            message: message.into(),
            origin: None,
        }
    }

    /// Lower bound above upper bound
    pub fn inverted_bounds(what: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::misconfigured(format!(
            "{} minimum {} is greater than maximum {}",
            what, min, max
        ))
    }

    /// Unreadable or malformed schema file
    pub fn file_invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::FileInvalid,
            message: format!("Invalid schema file '{}': {}", path, reason.into()),
            origin: Some(path),
        }
    }

    /// Name already registered
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::Duplicate,
            message: format!("Schema '{}' is already registered", name.into()),
            origin: None,
        }
    }

    /// Attaches the file the schema was declared in
    pub fn in_file(mut self, path: impl Into<String>) -> Self {
        self.origin = Some(path.into());
        self
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)?;
        if let Some(origin) = &self.origin {
            if self.code != SchemaErrorCode::FileInvalid {
                write!(f, " (in {})", origin)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;
