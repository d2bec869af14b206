//! Configuration file
//!
//! ```json
//! {
//!   "schema": ["doc.links[*].url", "doc.links[*].language"],
//!   "on_shred_error": "abort",
//!   "strict_fields": false,
//!   "log_level": "warn"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::ErrorPolicy;
use crate::observability::Severity;
use crate::schema::Schema;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Leaf paths in declaration order (required, non-empty)
    pub schema: Vec<String>,

    /// Policy for records the schema rejects (optional, default "abort")
    #[serde(default)]
    pub on_shred_error: ErrorPolicy,

    /// Reject record keys the schema does not declare (optional, default false)
    #[serde(default)]
    pub strict_fields: bool,

    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema.is_empty() {
            return Err(CliError::config_error("schema must declare at least one path"));
        }

        self.log_severity()?;

        Ok(())
    }

    /// The configured minimum log severity
    pub fn log_severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(|e: String| {
            CliError::config_error(format!(
                "Invalid log_level: {}. Expected one of trace, info, warn, error, fatal.",
                e
            ))
        })
    }

    /// Compiles the configured schema paths
    pub fn compile_schema(&self) -> CliResult<Schema> {
        Ok(Schema::parse(&self.schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_json(&json!({"schema": ["a"]}).to_string()).unwrap();
        assert_eq!(config.on_shred_error, ErrorPolicy::Abort);
        assert!(!config.strict_fields);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_config_rejects_empty_schema() {
        let err = Config::from_json(r#"{"schema": []}"#).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_rejects_unknown_policy_and_level() {
        assert!(Config::from_json(r#"{"schema": ["a"], "on_shred_error": "retry"}"#).is_err());
        assert!(Config::from_json(r#"{"schema": ["a"], "log_level": "loud"}"#).is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("dremel.json");
        let content = json!({
            "schema": ["doc.links[*].url"],
            "on_shred_error": "skip",
            "strict_fields": true
        });
        fs::write(&config_path, content.to_string()).unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.on_shred_error, ErrorPolicy::Skip);
        assert!(config.strict_fields);
        assert_eq!(config.compile_schema().unwrap().leaf_count(), 1);
    }

    #[test]
    fn test_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code_str(), "DREMEL_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_malformed_schema_path_keeps_schema_code() {
        let config = Config::from_json(r#"{"schema": ["a..b"]}"#).unwrap();
        let err = config.compile_schema().unwrap_err();
        assert_eq!(err.code_str(), "DREMEL_SCHEMA_MALFORMED_PATH");
    }
}
