use http::HeaderMap;

use crate::auth::{authenticate, build_allowed_key_set, AllowedClientKeys};
use crate::config::AppConfig;
use crate::error::ProxyError;
use crate::transport::HttpTransport;

/// Shared immutable state for the request dispatch path.
pub struct AppState {
    pub config: AppConfig,
    pub transport: HttpTransport,
    pub allowed_client_keys: AllowedClientKeys,
}

impl AppState {
    /// # Errors
    ///
    /// Returns `ProxyError::Transport` if the outbound HTTP client cannot be
    /// built.
    pub fn new(config: AppConfig) -> Result<Self, ProxyError> {
        let allowed_client_keys = build_allowed_key_set(&config);
        let transport = HttpTransport::new()?;
        Ok(Self {
            config,
            transport,
            allowed_client_keys,
        })
    }

    /// # Errors
    ///
    /// Returns `ProxyError::Auth` when the request carries no valid API key.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), ProxyError> {
        authenticate(headers, &self.allowed_client_keys)
    }
}
