//! Configuration for the schemagen CLI
//!
//! Loads configuration from:
//! 1. schemagen.yaml - input schema, output locations, logging
//! 2. environment variables (a .env file is loaded first if present)
//!
//! Environment variables always override schemagen.yaml values; command-line
//! flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "schemagen.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Where the SDL source is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub schema: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("schema.graphql"),
        }
    }
}

/// Where generated artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,

    /// File name of the DDL script inside `directory`
    pub sql_file: String,

    /// File name of the API schema SDL inside `directory`
    pub graphql_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./generated"),
            sql_file: "schema.sql".to_string(),
            graphql_file: "schema.graphql".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn sql_path(&self) -> PathBuf {
        self.directory.join(&self.sql_file)
    }

    pub fn graphql_path(&self) -> PathBuf {
        self.directory.join(&self.graphql_file)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults with environment variable overrides, for runs without a file
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// `path` if given, else `schemagen.yaml` when it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::from_env()),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(schema) = std::env::var("SCHEMAGEN_SCHEMA") {
            self.input.schema = PathBuf::from(schema);
        }

        if let Ok(dir) = std::env::var("SCHEMAGEN_OUT_DIR") {
            self.output.directory = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("SCHEMAGEN_SQL_FILE") {
            self.output.sql_file = file;
        }
        if let Ok(file) = std::env::var("SCHEMAGEN_GRAPHQL_FILE") {
            self.output.graphql_file = file;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.schema, PathBuf::from("schema.graphql"));
        assert_eq!(config.output.sql_path(), PathBuf::from("./generated/schema.sql"));
        assert_eq!(config.output.graphql_path(), PathBuf::from("./generated/schema.graphql"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            serde_yaml::from_str("input:\n  schema: \"models/app.graphql\"\n").unwrap();
        assert_eq!(config.input.schema, PathBuf::from("models/app.graphql"));
        assert_eq!(config.output.sql_file, "schema.sql");
    }

    #[test]
    fn test_env_var_override() {
        std::env::set_var("SCHEMAGEN_OUT_DIR", "/tmp/schemagen-out");
        std::env::set_var("SCHEMAGEN_SQL_FILE", "ddl.sql");

        let config_yaml = r#"
input:
  schema: "schema.graphql"
output:
  directory: "./generated"
  sql_file: "schema.sql"
  graphql_file: "api.graphql"
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemagen.yaml");
        std::fs::write(&path, config_yaml).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output.directory, PathBuf::from("/tmp/schemagen-out")); // Overridden
        assert_eq!(config.output.sql_file, "ddl.sql"); // Overridden
        assert_eq!(config.output.graphql_file, "api.graphql");

        std::env::remove_var("SCHEMAGEN_OUT_DIR");
        std::env::remove_var("SCHEMAGEN_SQL_FILE");
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "output: [unterminated").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Yaml(_))));
    }
}
