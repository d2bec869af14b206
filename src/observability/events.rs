//! Observable pipeline events
//!
//! Events are explicit and typed; their string names are stable. Batch and
//! assembly lifecycles are logged by `ObservationScope` as `SHRED_BATCH_*` and
//! `ASSEMBLY_*`.

use std::fmt;

/// Observable events of the shred and assembly pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// Schema paths compiled into a descriptor tree
    SchemaParsed,
    /// FSM built for a schema
    FsmBuilt,

    // Shredding
    /// A record was rejected and skipped
    RecordSkipped,

    // Assembly
    /// Column streams and FSM fell out of sync (FATAL)
    AssemblyFailed,

    // Round trip
    /// A reassembled record differs from its input
    RoundtripMismatch,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaParsed => "SCHEMA_PARSED",
            Event::FsmBuilt => "FSM_BUILT",

            Event::RecordSkipped => "RECORD_SKIPPED",

            Event::AssemblyFailed => "ASSEMBLY_FAILED",

            Event::RoundtripMismatch => "ROUNDTRIP_MISMATCH",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::AssemblyFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
