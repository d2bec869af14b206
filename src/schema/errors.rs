//! Schema error types
//!
//! Error codes:
//! - DREMEL_SCHEMA_EMPTY (FATAL)
//! - DREMEL_SCHEMA_MALFORMED_PATH (FATAL)
//! - DREMEL_SCHEMA_REPETITION_CONFLICT (FATAL)
//! - DREMEL_SCHEMA_LEAF_CONFLICT (FATAL)
//! - DREMEL_SCHEMA_DUPLICATE_PATH (FATAL)
//! - DREMEL_SCHEMA_UNKNOWN_NODE (REJECT)
//!
//! Schema errors are raised before any record is processed, so every
//! construction error is fatal for the caller's batch.

use std::fmt;

use crate::errors::Severity;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// No paths were declared
    DremelSchemaEmpty,
    /// A path or one of its segments is malformed
    DremelSchemaMalformedPath,
    /// A field is declared both repeated and non-repeated
    DremelSchemaRepetitionConflict,
    /// A field is declared both as a leaf and as a group
    DremelSchemaLeafConflict,
    /// The same leaf path is declared twice
    DremelSchemaDuplicatePath,
    /// A node id does not belong to this schema
    DremelSchemaUnknownNode,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DremelSchemaEmpty => "DREMEL_SCHEMA_EMPTY",
            SchemaErrorCode::DremelSchemaMalformedPath => "DREMEL_SCHEMA_MALFORMED_PATH",
            SchemaErrorCode::DremelSchemaRepetitionConflict => "DREMEL_SCHEMA_REPETITION_CONFLICT",
            SchemaErrorCode::DremelSchemaLeafConflict => "DREMEL_SCHEMA_LEAF_CONFLICT",
            SchemaErrorCode::DremelSchemaDuplicatePath => "DREMEL_SCHEMA_DUPLICATE_PATH",
            SchemaErrorCode::DremelSchemaUnknownNode => "DREMEL_SCHEMA_UNKNOWN_NODE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::DremelSchemaUnknownNode => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// The declared path that caused the error, if any
    path: Option<String>,
}

impl SchemaError {
    /// Create an error for an empty path list
    pub fn empty() -> Self {
        Self {
            code: SchemaErrorCode::DremelSchemaEmpty,
            message: "Schema must declare at least one path".into(),
            path: None,
        }
    }

    /// Create an error for a malformed path
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::DremelSchemaMalformedPath,
            message: format!("Malformed path '{}': {}", path, reason.into()),
            path: Some(path),
        }
    }

    /// Create an error for a field declared both repeated and non-repeated
    pub fn repetition_conflict(path: impl Into<String>, field: &str) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::DremelSchemaRepetitionConflict,
            message: format!(
                "Field '{}' in path '{}' is declared both repeated and non-repeated",
                field, path
            ),
            path: Some(path),
        }
    }

    /// Create an error for a field declared both as a leaf and as a group
    pub fn leaf_conflict(path: impl Into<String>, field: &str) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::DremelSchemaLeafConflict,
            message: format!(
                "Field '{}' in path '{}' is declared both as a leaf and as a group",
                field, path
            ),
            path: Some(path),
        }
    }

    /// Create an error for a leaf path declared twice
    pub fn duplicate_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::DremelSchemaDuplicatePath,
            message: format!("Path '{}' is declared more than once", path),
            path: Some(path),
        }
    }

    /// Create an error for a node id outside this schema
    pub fn unknown_node(index: usize, node_count: usize) -> Self {
        Self {
            code: SchemaErrorCode::DremelSchemaUnknownNode,
            message: format!(
                "Node {} does not belong to this schema ({} nodes)",
                index, node_count
            ),
            path: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
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

    /// Returns the offending path if applicable
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
