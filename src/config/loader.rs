//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RpcConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RpcConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RpcConfig, ConfigError> {
    let config: RpcConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.limits.max_body_bytes, 1024 * 1024);
        assert_eq!(config.limits.request_timeout_secs, 30);
        assert!(config.access.allow.is_empty());
        assert!(!config.access.bind_local);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "0.0.0.0:9000"

            [access]
            allow = ["10.0.0.1", "::1"]
            bind_local = true

            [limits]
            max_body_bytes = 4096
            request_timeout_secs = 5

            [observability]
            log_level = "debug"
            metrics_enabled = true
            metrics_address = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.access.allow, vec!["10.0.0.1", "::1"]);
        assert!(config.access.bind_local);
        assert_eq!(config.limits.max_body_bytes, 4096);
        assert_eq!(config.limits.request_timeout_secs, 5);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[limits]\nmax_body_bytes = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config("[access]\nallow = [\"nope\"]").unwrap_err();
        assert!(matches!(&err, ConfigError::Validation(errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: access.allow"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/httprpc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
