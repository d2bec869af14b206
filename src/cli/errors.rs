//! CLI-specific error types
//!
//! All CLI errors end the command. Pipeline errors keep the code of the
//! subsystem that raised them.

use std::fmt;
use std::io;

use crate::assembly::AssemblyError;
use crate::schema::SchemaError;
use crate::shred::ShredError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Malformed input on stdin
    InputError,
    /// Error raised by the schema, shred or assembly pipeline
    Pipeline(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DREMEL_CLI_CONFIG_ERROR",
            Self::IoError => "DREMEL_CLI_IO_ERROR",
            Self::InputError => "DREMEL_CLI_INPUT_ERROR",
            Self::Pipeline(code) => code,
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

    /// Input error, e.g. a line that is not JSON
    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, msg)
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
        Self::input_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::Pipeline(e.code().code()), e.message())
    }
}

impl From<ShredError> for CliError {
    fn from(e: ShredError) -> Self {
        let message = match e.record() {
            Some(record) => format!("{} (record {})", e.message(), record),
            None => e.message().to_string(),
        };
        Self::new(CliErrorCode::Pipeline(e.code().code()), message)
    }
}

impl From<AssemblyError> for CliError {
    fn from(e: AssemblyError) -> Self {
        let message = match e.record() {
            Some(record) => format!("{} (record {})", e.message(), record),
            None => e.message().to_string(),
        };
        Self::new(CliErrorCode::Pipeline(e.code().code()), message)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
