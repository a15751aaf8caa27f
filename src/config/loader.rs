//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationIssue};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [directions]
            name = "directions"
            base_url = "http://127.0.0.1:1"
            timeout_ms = 100
            max_retries = 2
            retry_delays_ms = [5, 10]
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.directions.0.name, "directions");
        assert_eq!(config.directions.0.retry_delays_ms, vec![5, 10]);
        assert_eq!(config.weather.0.name, "openweathermap");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_rejects_short_delay_list() {
        let err = parse_config(
            r#"
            [weather]
            name = "weather"
            base_url = "http://localhost"
            timeout_ms = 100
            max_retries = 3
            retry_delays_ms = [10]
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(ref issues) if issues.len() == 1));
        assert!(err.to_string().contains("weather.retry_delays_ms"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = parse_config("[breaker\nfailure_threshold = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
