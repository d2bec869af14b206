//! Assembly error types
//!
//! Error codes:
//! - DREMEL_ASSEMBLY_READER_EXHAUSTED (FATAL)
//! - DREMEL_ASSEMBLY_MISSING_TRANSITION (FATAL)
//! - DREMEL_ASSEMBLY_INVALID_LEVEL (FATAL)
//! - DREMEL_ASSEMBLY_CONFLICTING_VALUE (FATAL)
//! - DREMEL_ASSEMBLY_READER_COUNT (FATAL)
//! - DREMEL_ASSEMBLY_COLUMN_MISMATCH (FATAL)
//!
//! Column readers cannot be rewound, so any inconsistency between the streams
//! and the FSM ends assembly.

use std::fmt;

use crate::errors::Severity;
use crate::schema::Level;

/// Assembly-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyErrorCode {
    /// A column ran out of entries in the middle of a record
    DremelAssemblyReaderExhausted,
    /// The FSM has no transition for the peeked repetition level
    DremelAssemblyMissingTransition,
    /// An entry carries levels its column cannot hold
    DremelAssemblyInvalidLevel,
    /// A value would overwrite an existing field
    DremelAssemblyConflictingValue,
    /// The number of readers does not match the number of leaves
    DremelAssemblyReaderCount,
    /// Columns do not line up with the schema or with each other
    DremelAssemblyColumnMismatch,
}

impl AssemblyErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            AssemblyErrorCode::DremelAssemblyReaderExhausted => "DREMEL_ASSEMBLY_READER_EXHAUSTED",
            AssemblyErrorCode::DremelAssemblyMissingTransition => {
                "DREMEL_ASSEMBLY_MISSING_TRANSITION"
            }
            AssemblyErrorCode::DremelAssemblyInvalidLevel => "DREMEL_ASSEMBLY_INVALID_LEVEL",
            AssemblyErrorCode::DremelAssemblyConflictingValue => {
                "DREMEL_ASSEMBLY_CONFLICTING_VALUE"
            }
            AssemblyErrorCode::DremelAssemblyReaderCount => "DREMEL_ASSEMBLY_READER_COUNT",
            AssemblyErrorCode::DremelAssemblyColumnMismatch => "DREMEL_ASSEMBLY_COLUMN_MISMATCH",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for AssemblyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Assembly error type with full context
#[derive(Debug, Clone)]
pub struct AssemblyError {
    code: AssemblyErrorCode,
    message: String,
    /// Column path involved, if any
    column: Option<String>,
    /// Zero-based index of the record being assembled
    record: Option<usize>,
}

impl AssemblyError {
    fn new(code: AssemblyErrorCode, column: Option<&str>, message: String) -> Self {
        Self {
            code,
            message,
            column: column.map(str::to_string),
            record: None,
        }
    }

    /// Create an error for a column that ran dry mid-record
    pub fn reader_exhausted(column: &str) -> Self {
        Self::new(
            AssemblyErrorCode::DremelAssemblyReaderExhausted,
            Some(column),
            format!("Column '{}' ended in the middle of a record", column),
        )
    }

    /// Create an error for a repetition level with no FSM transition
    pub fn missing_transition(column: &str, level: Level) -> Self {
        Self::new(
            AssemblyErrorCode::DremelAssemblyMissingTransition,
            Some(column),
            format!(
                "No transition out of '{}' at repetition level {}",
                column, level
            ),
        )
    }

    /// Create an error for an entry with impossible levels
    pub fn invalid_level(column: &str, reason: impl Into<String>) -> Self {
        Self::new(
            AssemblyErrorCode::DremelAssemblyInvalidLevel,
            Some(column),
            format!("Invalid entry in '{}': {}", column, reason.into()),
        )
    }

    /// Create an error for a field assigned twice
    pub fn conflicting_value(path: &str) -> Self {
        Self::new(
            AssemblyErrorCode::DremelAssemblyConflictingValue,
            Some(path),
            format!("Field '{}' would be assigned more than once", path),
        )
    }

    /// Create an error for a reader count that differs from the leaf count
    pub fn reader_count(expected: usize, found: usize) -> Self {
        Self::new(
            AssemblyErrorCode::DremelAssemblyReaderCount,
            None,
            format!("Expected {} column readers, found {}", expected, found),
        )
    }

    /// Create an error for columns that do not line up
    pub fn column_mismatch(message: impl Into<String>) -> Self {
        Self::new(AssemblyErrorCode::DremelAssemblyColumnMismatch, None, message.into())
    }

    /// Attaches the index of the record being assembled
    pub fn at_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> AssemblyErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column path involved, if any
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns the record index if attached
    pub fn record(&self) -> Option<usize> {
        self.record
    }
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(record) = self.record {
            write!(f, " (record {})", record)?;
        }
        Ok(())
    }
}

impl std::error::Error for AssemblyError {}

/// Result type for assembly operations
pub type AssemblyResult<T> = Result<T, AssemblyError>;
