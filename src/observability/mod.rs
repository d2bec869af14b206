//! Observability for the shred and assembly pipeline
//!
//! - Structured JSON logging to stderr, filtered by a minimum severity
//! - Typed lifecycle events
//! - Lock-free counters
//!
//! Observability never changes pipeline results and runs no background work.
//!
//! ```ignore
//! use dremel::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::init(Severity::Info);
//! log_event_with_fields(Event::FsmBuilt, &[("leaves", "6")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_MIN_SEVERITY};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        assert_eq!(severity_of(Event::AssemblyFailed), Severity::Fatal);
        assert_eq!(severity_of(Event::SchemaParsed), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::FsmBuilt, &[("leaves", "2")]);
    }
}
