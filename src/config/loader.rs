//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `credentials.key`.
pub const KEY_ENV: &str = "COINPAYMENTS_KEY";
/// Environment variable overriding `credentials.secret`.
pub const SECRET_ENV: &str = "COINPAYMENTS_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Validation(Vec<ValidationError>),
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ClientConfig = toml::from_str(&content)?;
    finish(config)
}

/// Build a configuration from defaults plus environment credentials.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    finish(ClientConfig::default())
}

fn finish(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::debug!(
        endpoint = %config.api.endpoint,
        auto_track = config.tracking.auto_track,
        poll_interval_secs = config.tracking.poll_interval_secs,
        "Configuration loaded"
    );
    Ok(config)
}

/// Overwrite credentials with non-empty values from `lookup`.
///
/// Secrets are expected to come from the environment rather than files.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(KEY_ENV).filter(|v| !v.is_empty()) {
        config.credentials.key = key;
    }
    if let Some(secret) = lookup(SECRET_ENV).filter(|v| !v.is_empty()) {
        config.credentials.secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = ClientConfig::default();
        config.credentials.key = "from-file".into();
        apply_env_overrides(&mut config, |name| match name {
            SECRET_ENV => Some("from-env".to_string()),
            KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.credentials.key, "from-file");
        assert_eq!(config.credentials.secret, "from-env");
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join("coinpayments_loader_test.toml");
        std::fs::write(
            &path,
            "[credentials]\nkey = \"k\"\nsecret = \"s\"\n[tracking]\npoll_interval_secs = 5\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.tracking.poll_interval_secs, 5);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_config_rejects_bad_values() {
        let path = std::env::temp_dir().join("coinpayments_loader_invalid.toml");
        std::fs::write(
            &path,
            "[credentials]\nkey = \"k\"\nsecret = \"s\"\n[tracking]\npoll_interval_secs = 0\n",
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("poll_interval_secs"));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/coinpayments.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
