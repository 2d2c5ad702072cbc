use http::header::AUTHORIZATION;
use rustc_hash::FxHashSet;

use crate::config::AppConfig;
use crate::error::ProxyError;

/// Compact key index used in hot-path authentication.
pub enum AllowedClientKeys {
    Empty,
    Single { bearer: Box<str> },
    Multiple(FxHashSet<String>),
}

/// Extract the API key from `Authorization: Bearer <key>`.
///
/// # Errors
///
/// Returns `ProxyError::Auth` when the header is absent or not a bearer token.
pub fn extract_api_key(headers: &http::HeaderMap) -> Result<&str, ProxyError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| ProxyError::Auth("Missing API key".to_string()))
}

/// Authenticate an incoming request against the pre-indexed allowed keys.
///
/// # Errors
///
/// Returns `ProxyError::Auth` when the API key is missing or invalid.
pub fn authenticate(
    headers: &http::HeaderMap,
    allowed_keys: &AllowedClientKeys,
) -> Result<(), ProxyError> {
    match allowed_keys {
        AllowedClientKeys::Single { bearer } => match headers.get(AUTHORIZATION) {
            Some(value) if value.as_bytes() == bearer.as_bytes() => Ok(()),
            Some(_) => Err(ProxyError::Auth("Invalid API key".to_string())),
            None => Err(ProxyError::Auth("Missing API key".to_string())),
        },
        AllowedClientKeys::Multiple(allowed_set) => {
            let client_key = extract_api_key(headers)?;
            if allowed_set.contains(client_key) {
                Ok(())
            } else {
                Err(ProxyError::Auth("Invalid API key".to_string()))
            }
        }
        AllowedClientKeys::Empty => Err(ProxyError::Auth("Invalid API key".to_string())),
    }
}

/// Build a hash-set index for allowed client keys.
#[must_use]
pub fn build_allowed_key_set(config: &AppConfig) -> AllowedClientKeys {
    let mut allowed_set: FxHashSet<String> = config
        .client_authentication
        .allowed_keys
        .iter()
        .cloned()
        .collect();

    match allowed_set.len() {
        0 => AllowedClientKeys::Empty,
        1 => match allowed_set.drain().next() {
            Some(single_key) => AllowedClientKeys::Single {
                bearer: format!("Bearer {single_key}").into_boxed_str(),
            },
            None => AllowedClientKeys::Empty,
        },
        _ => AllowedClientKeys::Multiple(allowed_set),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ClientAuthConfig, FeaturesConfig, ServerConfig, UpstreamConfig};

    fn make_config(allowed_keys: Vec<String>) -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            client_authentication: ClientAuthConfig { allowed_keys },
            features: FeaturesConfig::default(),
        }
    }

    fn bearer_headers(key: &str) -> http::HeaderMap {
        let mut headers = http::HeaderMap::new();
        headers.insert("authorization", format!("Bearer {key}").parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = bearer_headers("sk-test123");
        assert_eq!(extract_api_key(&headers).unwrap(), "sk-test123");
    }

    #[test]
    fn test_extract_missing_header() {
        let headers = http::HeaderMap::new();
        assert!(extract_api_key(&headers).is_err());
    }

    #[test]
    fn test_extract_non_bearer_scheme() {
        let mut headers = http::HeaderMap::new();
        headers.insert("authorization", "Basic abc123".parse().unwrap());
        assert!(extract_api_key(&headers).is_err());
    }

    #[test]
    fn test_single_key_match() {
        let config = make_config(vec!["sk-only".to_string()]);
        let allowed = build_allowed_key_set(&config);
        assert!(matches!(allowed, AllowedClientKeys::Single { .. }));
        assert!(authenticate(&bearer_headers("sk-only"), &allowed).is_ok());
        assert!(authenticate(&bearer_headers("sk-wrong"), &allowed).is_err());
    }

    #[test]
    fn test_multiple_keys_match() {
        let config = make_config(vec!["sk-a".to_string(), "sk-b".to_string()]);
        let allowed = build_allowed_key_set(&config);
        assert!(matches!(allowed, AllowedClientKeys::Multiple(_)));
        assert!(authenticate(&bearer_headers("sk-a"), &allowed).is_ok());
        assert!(authenticate(&bearer_headers("sk-b"), &allowed).is_ok());
        assert!(authenticate(&bearer_headers("sk-c"), &allowed).is_err());
    }

    #[test]
    fn test_empty_keys_reject_everything() {
        let config = make_config(vec![]);
        let allowed = build_allowed_key_set(&config);
        assert!(authenticate(&bearer_headers("sk-any"), &allowed).is_err());
        assert!(authenticate(&http::HeaderMap::new(), &allowed).is_err());
    }

    #[test]
    fn test_duplicate_single_key_collapses() {
        let config = make_config(vec!["sk-dup".to_string(), "sk-dup".to_string()]);
        let allowed = build_allowed_key_set(&config);
        assert!(matches!(allowed, AllowedClientKeys::Single { .. }));
        assert!(authenticate(&bearer_headers("sk-dup"), &allowed).is_ok());
    }
}
