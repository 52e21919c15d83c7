//! Application configuration
//!
//! Loaded once from a JSON file and passed explicitly to whatever needs
//! it. Optional fields fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::auth::TokenConfig;
use crate::cli::{CliError, CliResult};
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bearer token settings (required)
    pub token: TokenConfig,

    /// Directory holding declarative schema files (default: "./schemas")
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Minimum log severity (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("./schemas")
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: AppConfig = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.token.secret.trim().is_empty() {
            return Err(CliError::config_error("token.secret must not be empty"));
        }

        if matches!(&self.token.issuer, Some(iss) if iss.is_empty()) {
            return Err(CliError::config_error("token.issuer must not be empty when set"));
        }

        if matches!(&self.token.audience, Some(aud) if aud.is_empty()) {
            return Err(CliError::config_error("token.audience must not be empty when set"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_json(r#"{"token": {"secret": "s3cret"}}"#).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("./schemas"));
        assert_eq!(config.log_level, Severity::Info);
        assert_eq!(config.token.leeway_secs, 60);
        assert!(config.token.issuer.is_none());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = AppConfig::from_json(r#"{"token": {"secret": "  "}}"#).unwrap_err();
        assert_eq!(err.code_str(), "SCHEMAGUARD_CLI_CONFIG_ERROR");
        assert!(err.message().contains("secret"));
    }

    #[test]
    fn test_missing_token_section_rejected() {
        assert!(AppConfig::from_json(r#"{"schema_dir": "/tmp"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "token": {{"secret": "abc", "issuer": "auth.local", "leeway_secs": 5}},
                "schema_dir": "/etc/schemaguard",
                "log_level": "warn"
            }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.token.issuer.as_deref(), Some("auth.local"));
        assert_eq!(config.token.leeway_secs, 5);
        assert_eq!(config.schema_dir, PathBuf::from("/etc/schemaguard"));
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::load(Path::new("/nonexistent/schemaguard.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
