//! Outbound HTTP to the upstream chat service.
//!
//! The upstream only serves its own web frontend, so every call carries the
//! frontend's browser fingerprint headers. Token handling follows the same
//! model: each conversation preferentially runs on a fresh anonymous token
//! fetched from the frontend's auth endpoint, falling back to the configured
//! token when that fails.

use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::protocol::upstream::{AuthsResponse, UpstreamChatRequest};

/// Where the bearer token for one upstream call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Anonymous,
    Configured,
}

/// The token selected for one upstream call.
pub struct CallToken {
    pub token: String,
    pub source: TokenSource,
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the shared outbound client.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Transport` if the TLS backend fails to initialize.
    pub fn new() -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .tcp_nodelay(true)
            .connect_timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ProxyError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Pick the bearer token for one upstream call.
    ///
    /// Anonymous acquisition failures are logged and absorbed; the caller
    /// always gets a usable token value (possibly the configured one, which
    /// validation guarantees is non-empty when anonymous mode is off).
    pub async fn select_call_token(&self, upstream: &UpstreamConfig) -> CallToken {
        if upstream.anon_token_enabled {
            match self.fetch_anonymous_token(upstream).await {
                Ok(token) => {
                    return CallToken {
                        token,
                        source: TokenSource::Anonymous,
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "anonymous token fetch failed, using configured token");
                }
            }
        }
        CallToken {
            token: upstream.token.clone(),
            source: TokenSource::Configured,
        }
    }

    /// Fetch a fresh visitor token from the frontend's auth endpoint.
    async fn fetch_anonymous_token(&self, upstream: &UpstreamConfig) -> Result<String, ProxyError> {
        let url = format!("{}/api/v1/auths/", upstream.origin_base.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(upstream.token_timeout_secs))
            .header(http::header::USER_AGENT, &upstream.browser_ua)
            .header("X-FE-Version", &upstream.x_fe_version)
            .send()
            .await
            .map_err(|err| ProxyError::Transport(format!("token request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(ProxyError::Transport(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let auths: AuthsResponse = response
            .json()
            .await
            .map_err(|err| ProxyError::Transport(format!("token response undecodable: {err}")))?;
        match auths.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ProxyError::Transport(
                "token endpoint returned no token".to_string(),
            )),
        }
    }

    /// Open the upstream chat call and return the streaming response.
    ///
    /// The whole handshake (connect, send, response headers) runs under the
    /// configured call timeout; the body stream itself is not deadline-bound.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Transport` on connection failure or timeout, and
    /// `ProxyError::Upstream` when the upstream answers with a non-success
    /// status.
    pub async fn open_chat_stream(
        &self,
        upstream: &UpstreamConfig,
        request: &UpstreamChatRequest,
        token: &str,
    ) -> Result<reqwest::Response, ProxyError> {
        let origin = upstream.origin_base.trim_end_matches('/');
        let referer = format!("{origin}/c/{}", request.chat_id);

        let call = self
            .client
            .post(&upstream.chat_url)
            .bearer_auth(token)
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::ACCEPT, "text/event-stream")
            .header(http::header::USER_AGENT, &upstream.browser_ua)
            .header(http::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header("sec-ch-ua", &upstream.sec_ch_ua)
            .header("sec-ch-ua-mobile", &upstream.sec_ch_ua_mobile)
            .header("sec-ch-ua-platform", &upstream.sec_ch_ua_platform)
            .header("X-FE-Version", &upstream.x_fe_version)
            .header(http::header::ORIGIN, origin)
            .header(http::header::REFERER, referer)
            .json(request)
            .send();

        let response = tokio::time::timeout(
            Duration::from_secs(upstream.call_timeout_secs),
            call,
        )
        .await
        .map_err(|_| {
            ProxyError::Transport(format!(
                "upstream call timed out after {}s",
                upstream.call_timeout_secs
            ))
        })?
        .map_err(|err| ProxyError::Transport(format!("upstream call failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: "Upstream error".to_string(),
            });
        }
        Ok(response)
    }
}
