//! Security configuration for viewer fingerprints and code binding.

use serde::Deserialize;

use super::types::default_true;

/// Security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret key for HMAC-based viewer fingerprints.
    /// Required. Bindings made under one secret do not match under another,
    /// so it must stay stable across restarts and instances.
    pub fingerprint_secret: String,
    /// Bind event codes to the first viewer network that uses them (default: true).
    /// When false, any active code is accepted from any address.
    #[serde(default = "default_true")]
    pub enforce_ip_binding_when_code_provided: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_enforced_by_default() {
        let config: SecurityConfig = toml::from_str(r#"fingerprint_secret = "abc""#).unwrap();
        assert!(config.enforce_ip_binding_when_code_provided);
    }

    #[test]
    fn secret_is_required() {
        assert!(toml::from_str::<SecurityConfig>("").is_err());
    }

    #[test]
    fn binding_can_be_disabled() {
        let config: SecurityConfig = toml::from_str(
            r#"
fingerprint_secret = "abc"
enforce_ip_binding_when_code_provided = false
"#,
        )
        .unwrap();
        assert!(!config.enforce_ip_binding_when_code_provided);
    }
}
