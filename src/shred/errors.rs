//! Shredding error types
//!
//! Error codes:
//! - DREMEL_SHRED_NOT_AN_OBJECT (REJECT)
//! - DREMEL_SHRED_EXPECTED_ARRAY (REJECT)
//! - DREMEL_SHRED_UNEXPECTED_ARRAY (REJECT)
//! - DREMEL_SHRED_NOT_A_SCALAR (REJECT)
//! - DREMEL_SHRED_NULL_ELEMENT (REJECT)
//! - DREMEL_SHRED_UNDECLARED_FIELD (REJECT)
//!
//! A shred error rejects one record. Entries already written for that record
//! are rolled back, so the caller may continue with the next one.

use std::fmt;

use crate::errors::Severity;

/// Shred-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShredErrorCode {
    /// The record or a group value is not a JSON object
    DremelShredNotAnObject,
    /// A repeated field holds something other than an array
    DremelShredExpectedArray,
    /// A non-repeated field holds an array
    DremelShredUnexpectedArray,
    /// A leaf holds an object or an array
    DremelShredNotAScalar,
    /// A repeated field contains a null element
    DremelShredNullElement,
    /// Strict mode: the record carries a key the schema does not declare
    DremelShredUndeclaredField,
    /// The target columns were built for another schema
    DremelShredForeignColumns,
}

impl ShredErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ShredErrorCode::DremelShredNotAnObject => "DREMEL_SHRED_NOT_AN_OBJECT",
            ShredErrorCode::DremelShredExpectedArray => "DREMEL_SHRED_EXPECTED_ARRAY",
            ShredErrorCode::DremelShredUnexpectedArray => "DREMEL_SHRED_UNEXPECTED_ARRAY",
            ShredErrorCode::DremelShredNotAScalar => "DREMEL_SHRED_NOT_A_SCALAR",
            ShredErrorCode::DremelShredNullElement => "DREMEL_SHRED_NULL_ELEMENT",
            ShredErrorCode::DremelShredUndeclaredField => "DREMEL_SHRED_UNDECLARED_FIELD",
            ShredErrorCode::DremelShredForeignColumns => "DREMEL_SHRED_FOREIGN_COLUMNS",
        }
    }

    /// Record errors reject only the offending record; foreign columns
    /// reject every record
    pub fn severity(&self) -> Severity {
        match self {
            ShredErrorCode::DremelShredForeignColumns => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ShredErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Shred error type with full context
#[derive(Debug, Clone)]
pub struct ShredError {
    code: ShredErrorCode,
    message: String,
    /// Schema path of the offending field; empty for the record itself
    path: String,
    /// Position of the record in its batch, if known
    record: Option<usize>,
}

impl ShredError {
    fn new(code: ShredErrorCode, path: &str, message: String) -> Self {
        Self {
            code,
            message,
            path: path.to_string(),
            record: None,
        }
    }

    pub fn not_an_object(path: &str, found: &str) -> Self {
        let target = if path.is_empty() { "record" } else { path };
        Self::new(
            ShredErrorCode::DremelShredNotAnObject,
            path,
            format!("Expected an object at '{}', found {}", target, found),
        )
    }

    pub fn expected_array(path: &str, found: &str) -> Self {
        Self::new(
            ShredErrorCode::DremelShredExpectedArray,
            path,
            format!("Repeated field '{}' must hold an array, found {}", path, found),
        )
    }

    pub fn unexpected_array(path: &str) -> Self {
        Self::new(
            ShredErrorCode::DremelShredUnexpectedArray,
            path,
            format!("Field '{}' is not repeated but holds an array", path),
        )
    }

    pub fn not_a_scalar(path: &str, found: &str) -> Self {
        Self::new(
            ShredErrorCode::DremelShredNotAScalar,
            path,
            format!("Leaf '{}' must hold a scalar, found {}", path, found),
        )
    }

    pub fn null_element(path: &str, index: usize) -> Self {
        Self::new(
            ShredErrorCode::DremelShredNullElement,
            path,
            format!("Repeated field '{}' has a null element at index {}", path, index),
        )
    }

    pub fn undeclared_field(parent: &str, key: &str) -> Self {
        let path = if parent.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", parent, key)
        };
        Self::new(
            ShredErrorCode::DremelShredUndeclaredField,
            &path,
            format!("Field '{}' is not declared in the schema", path),
        )
    }

    pub fn foreign_columns(path: &str, reason: impl Into<String>) -> Self {
        Self::new(
            ShredErrorCode::DremelShredForeignColumns,
            path,
            format!("Columns do not belong to this schema: {}", reason.into()),
        )
    }

    /// Attaches the record's position in its batch
    pub fn at_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> ShredErrorCode {
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

    /// Returns the schema path of the offending field
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether no further record can be shredded into the same columns
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns the record position if attached
    pub fn record(&self) -> Option<usize> {
        self.record
    }
}

impl fmt::Display for ShredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(record) = self.record {
            write!(f, " (record {})", record)?;
        }
        Ok(())
    }
}

impl std::error::Error for ShredError {}

/// Result type for shred operations
pub type ShredResult<T> = Result<T, ShredError>;

/// Short JSON type name for error messages
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
