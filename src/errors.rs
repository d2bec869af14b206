//! Crate-level error union
//!
//! Each subsystem owns its own error type with a stable code. Library callers
//! that drive the whole pipeline can use [`DremelError`] to carry any of them.

use std::fmt;

use thiserror::Error;

use crate::assembly::AssemblyError;
use crate::schema::SchemaError;
use crate::shred::ShredError;

/// Severity levels shared by the core error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending input is rejected, processing may continue
    Reject,
    /// Processing cannot continue with this input
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Result type for whole-pipeline operations
pub type DremelResult<T> = Result<T, DremelError>;

/// Any error raised by the core pipeline
#[derive(Debug, Clone, Error)]
pub enum DremelError {
    /// Schema construction or query failed
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// A record did not match the schema
    #[error("{0}")]
    Shred(#[from] ShredError),

    /// Column streams and FSM fell out of sync
    #[error("{0}")]
    Assembly(#[from] AssemblyError),
}

impl DremelError {
    /// Returns the stable string code of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            DremelError::Schema(e) => e.code().code(),
            DremelError::Shred(e) => e.code().code(),
            DremelError::Assembly(e) => e.code().code(),
        }
    }

    /// Returns the severity of the underlying error
    pub fn severity(&self) -> Severity {
        match self {
            DremelError::Schema(e) => e.severity(),
            DremelError::Shred(e) => e.severity(),
            DremelError::Assembly(e) => e.severity(),
        }
    }
}
