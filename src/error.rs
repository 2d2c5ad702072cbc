use serde_json::json;

/// Canonical error type used across all modules.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Auth error: {0}")]
    Auth(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Upstream error: status={status}, message={message}")]
    Upstream { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ProxyError {
    #[must_use]
    pub fn http_status(&self) -> http::StatusCode {
        match self {
            ProxyError::Auth(_) => http::StatusCode::UNAUTHORIZED,
            ProxyError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            // Upstream failures surface as a bad gateway, never as a success
            // with an error body.
            ProxyError::Upstream { .. } | ProxyError::Transport(_) => http::StatusCode::BAD_GATEWAY,
            ProxyError::Config(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ProxyError::Auth(_) => "authentication_error",
            ProxyError::InvalidRequest(_) => "invalid_request_error",
            ProxyError::Upstream { .. } | ProxyError::Transport(_) => "upstream_error",
            ProxyError::Config(_) => "server_error",
        }
    }
}

/// Build an OpenAI-shaped error body for a [`ProxyError`].
#[must_use]
pub fn error_payload(err: &ProxyError) -> serde_json::Value {
    json!({
        "error": {
            "message": err.to_string(),
            "type": err.error_type(),
        }
    })
}

impl axum::response::IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        (status, axum::Json(error_payload(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_401() {
        let err = ProxyError::Auth("Missing API key".to_string());
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
        let body = error_payload(&err);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[test]
    fn test_upstream_error_maps_to_502() {
        let err = ProxyError::Upstream {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.http_status(), http::StatusCode::BAD_GATEWAY);
        let body = error_payload(&err);
        assert_eq!(body["error"]["type"], "upstream_error");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("status=500"));
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let err = ProxyError::InvalidRequest("bad json".to_string());
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }
}
