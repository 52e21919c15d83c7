//! Observability
//!
//! Structured one-line JSON logs with typed events.
//!
//! # Usage
//!
//! ```ignore
//! use schemaguard::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Warn);
//! log_event_with_fields(Event::AuthRejected, &[("reason", "token expired")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogStream, Logger, Severity};

/// Log a typed event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
