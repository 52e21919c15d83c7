//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::auth::AuthError;
use crate::schema::SchemaError;
use crate::validation::ValidationError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Schema file could not be compiled
    SchemaError,
    /// Input did not satisfy the schema
    ValidationFailed,
    /// Token was rejected
    AuthFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SCHEMAGUARD_CLI_CONFIG_ERROR",
            Self::IoError => "SCHEMAGUARD_CLI_IO_ERROR",
            Self::SchemaError => "SCHEMAGUARD_CLI_SCHEMA_ERROR",
            Self::ValidationFailed => "SCHEMAGUARD_CLI_VALIDATION_FAILED",
            Self::AuthFailed => "SCHEMAGUARD_CLI_AUTH_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Input failed validation with `count` errors
    pub fn validation_failed(count: usize) -> Self {
        Self::new(
            CliErrorCode::ValidationFailed,
            format!("input rejected with {} error(s)", count),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        Self::validation_failed(e.errors().len())
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        Self::new(CliErrorCode::AuthFailed, format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("token.secret must not be empty");
        assert_eq!(
            err.to_string(),
            "SCHEMAGUARD_CLI_CONFIG_ERROR: token.secret must not be empty"
        );
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: CliError = AuthError::TokenExpired.into();
        assert_eq!(err.code(), &CliErrorCode::AuthFailed);
        assert!(err.message().starts_with("TOKEN_EXPIRED"));
    }

    #[test]
    fn test_schema_error_conversion() {
        let err: CliError = SchemaError::misconfigured("enum must have at least one member").into();
        assert_eq!(err.code_str(), "SCHEMAGUARD_CLI_SCHEMA_ERROR");
    }
}
