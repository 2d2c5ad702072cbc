use super::{AppConfig, ConfigError};

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_allowed_keys(config)?;
    validate_upstream(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_allowed_keys(config: &AppConfig) -> Result<(), ConfigError> {
    if config.client_authentication.allowed_keys.is_empty() {
        return Err(validation_err("allowed_keys cannot be empty"));
    }
    for key in &config.client_authentication.allowed_keys {
        if key.trim().is_empty() {
            return Err(validation_err("allowed_keys contains an empty key"));
        }
    }
    Ok(())
}

fn validate_upstream(config: &AppConfig) -> Result<(), ConfigError> {
    let upstream = &config.upstream;

    validate_http_url("upstream.chat_url", &upstream.chat_url)?;
    validate_http_url("upstream.origin_base", &upstream.origin_base)?;

    if upstream.model_id.trim().is_empty() {
        return Err(validation_err("upstream.model_id cannot be empty"));
    }
    if upstream.model_name.trim().is_empty() {
        return Err(validation_err("upstream.model_name cannot be empty"));
    }
    if !upstream.anon_token_enabled && upstream.token.trim().is_empty() {
        return Err(validation_err(
            "upstream.token cannot be empty when anon_token_enabled is false",
        ));
    }
    if upstream.call_timeout_secs == 0 {
        return Err(validation_err(
            "upstream.call_timeout_secs must be greater than 0",
        ));
    }
    if upstream.token_timeout_secs == 0 {
        return Err(validation_err(
            "upstream.token_timeout_secs must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_http_url(field_name: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|err| validation_err(format!("{field_name} is not a valid URL: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_err(format!(
            "{field_name} must use http:// or https://"
        )));
    }
    Ok(())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let valid_levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];
    if !valid_levels.contains(&config.features.log_level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "log_level must be one of {valid_levels:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;

    fn make_valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            client_authentication: ClientAuthConfig {
                allowed_keys: vec!["sk-client-key".to_string()],
            },
            features: FeaturesConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_allowed_keys() {
        let mut config = make_valid_config();
        config.client_authentication.allowed_keys = vec![];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_blank_allowed_key() {
        let mut config = make_valid_config();
        config.client_authentication.allowed_keys = vec!["  ".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_chat_url() {
        let mut config = make_valid_config();
        config.upstream.chat_url = "ftp://bad.url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_origin_base() {
        let mut config = make_valid_config();
        config.upstream.origin_base = "not a url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_model_id() {
        let mut config = make_valid_config();
        config.upstream.model_id = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_token_with_anon_disabled() {
        let mut config = make_valid_config();
        config.upstream.anon_token_enabled = false;
        config.upstream.token = String::new();
        assert!(validate_config(&config).is_err());

        config.upstream.token = "sk-upstream".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = make_valid_config();
        config.upstream.call_timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = make_valid_config();
        config.upstream.token_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = make_valid_config();
        config.features.log_level = "VERBOSE".to_string();
        assert!(validate_config(&config).is_err());
    }
}
