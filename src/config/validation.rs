//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("security.fingerprint_secret must not be empty")]
    MissingFingerprintSecret,
    #[error("resolver.store_timeout_ms must be greater than zero")]
    ZeroStoreTimeout,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.security.fingerprint_secret.is_empty() {
        errors.push(ValidationError::MissingFingerprintSecret);
    }
    if config.resolver.store_timeout_ms == 0 {
        errors.push(ValidationError::ZeroStoreTimeout);
    }

    if let Some(ref db) = config.database {
        let db_path = Path::new(&db.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(db.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[server]
name = "watchgate"

[http]
address = "127.0.0.1:8080"

[security]
fingerprint_secret = "k3Jq9vX2pL7mN4rT8wY1zB6c"
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_secret_fails() {
        let toml = minimal_valid_config().replace("k3Jq9vX2pL7mN4rT8wY1zB6c", "");
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingFingerprintSecret)));
    }

    #[test]
    fn test_collects_every_error() {
        let toml = r#"
[server]
name = " "

[http]
address = "127.0.0.1:8080"

[database]
path = "/nonexistent/dir/watchgate.db"

[security]
fingerprint_secret = ""

[resolver]
store_timeout_ms = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServerName)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroStoreTimeout)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DatabasePathInvalid(_))));
    }

    #[test]
    fn test_relative_database_path_passes() {
        let toml = format!("{}\n[database]\npath = \"watchgate.db\"\n", minimal_valid_config());
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(validate(&config).is_ok());
    }
}
