//! Observable events
//!
//! Events are explicit and typed. The validation engine emits none of
//! these itself; they are logged by its callers.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,
    /// Schema directory loaded
    SchemasLoaded,
    /// A schema file was malformed or misconfigured
    SchemaRejected,
    /// Input failed validation at a boundary
    ValidationFailed,
    /// Bearer token verified, identity attached
    AuthAccepted,
    /// Request short-circuited as unauthorized
    AuthRejected,
    /// CLI command finished
    CommandComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::AuthAccepted => "AUTH_ACCEPTED",
            Event::AuthRejected => "AUTH_REJECTED",
            Event::CommandComplete => "COMMAND_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaRejected => Severity::Fatal,
            Event::ValidationFailed | Event::AuthRejected => Severity::Warn,
            Event::AuthAccepted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::SchemasLoaded.as_str(), "SCHEMAS_LOADED");
        assert_eq!(Event::AuthRejected.to_string(), "AUTH_REJECTED");
    }

    #[test]
    fn test_rejections_are_not_info() {
        assert_eq!(Event::AuthRejected.severity(), Severity::Warn);
        assert_eq!(Event::ValidationFailed.severity(), Severity::Warn);
        assert_eq!(Event::SchemaRejected.severity(), Severity::Fatal);
    }
}
