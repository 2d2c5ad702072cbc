use std::convert::Infallible;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use http::HeaderValue;

use crate::api::{chat, health, models};
use crate::state::AppState;

const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

enum RouteMatch {
    Health,
    Models,
    ChatCompletions,
    Preflight,
    MethodNotAllowed,
    NotFound,
}

/// Dispatch a raw HTTP request to the matching handler.
///
/// Every response, success or error, leaves with the permissive CORS
/// headers the original frontend-facing service advertised.
///
/// # Errors
///
/// This function currently never returns `Err` and uses `Infallible`.
pub async fn dispatch_request(
    state: Arc<AppState>,
    request: Request<Body>,
) -> Result<Response, Infallible> {
    let (parts, body) = request.into_parts();
    let route = match_route(&parts.method, parts.uri.path());

    let mut response = match route {
        RouteMatch::Health => health::handle_health(&state),
        RouteMatch::Models => models::handle_models(&state),
        RouteMatch::ChatCompletions => {
            let body_bytes = match read_request_body(body).await {
                Ok(bytes) => bytes,
                Err(response) => return Ok(apply_cors_headers(response)),
            };
            chat::handle_chat_completions(&state, &parts.headers, &body_bytes).await
        }
        RouteMatch::Preflight => StatusCode::OK.into_response(),
        RouteMatch::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        RouteMatch::NotFound => (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({
                "error": {"message": "Not found", "type": "invalid_request_error"}
            })),
        )
            .into_response(),
    };

    response = apply_cors_headers(response);
    Ok(response)
}

fn match_route(method: &Method, path: &str) -> RouteMatch {
    if method == Method::OPTIONS {
        return RouteMatch::Preflight;
    }
    match path {
        "/" => {
            if method == Method::GET {
                RouteMatch::Health
            } else {
                RouteMatch::MethodNotAllowed
            }
        }
        "/v1/models" => {
            if method == Method::GET {
                RouteMatch::Models
            } else {
                RouteMatch::MethodNotAllowed
            }
        }
        "/v1/chat/completions" => {
            if method == Method::POST {
                RouteMatch::ChatCompletions
            } else {
                RouteMatch::MethodNotAllowed
            }
        }
        _ => RouteMatch::NotFound,
    }
}

fn apply_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        "access-control-allow-credentials",
        HeaderValue::from_static("true"),
    );
    response
}

async fn read_request_body(body: Body) -> Result<bytes::Bytes, Response> {
    body::to_bytes(body, DEFAULT_BODY_LIMIT_BYTES)
        .await
        .map_err(|_| {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large (max 2MiB)",
            )
                .into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_known_routes() {
        assert!(matches!(
            match_route(&Method::GET, "/"),
            RouteMatch::Health
        ));
        assert!(matches!(
            match_route(&Method::GET, "/v1/models"),
            RouteMatch::Models
        ));
        assert!(matches!(
            match_route(&Method::POST, "/v1/chat/completions"),
            RouteMatch::ChatCompletions
        ));
    }

    #[test]
    fn test_wrong_method() {
        assert!(matches!(
            match_route(&Method::POST, "/v1/models"),
            RouteMatch::MethodNotAllowed
        ));
        assert!(matches!(
            match_route(&Method::GET, "/v1/chat/completions"),
            RouteMatch::MethodNotAllowed
        ));
    }

    #[test]
    fn test_options_matches_everywhere() {
        assert!(matches!(
            match_route(&Method::OPTIONS, "/v1/chat/completions"),
            RouteMatch::Preflight
        ));
        assert!(matches!(
            match_route(&Method::OPTIONS, "/anything"),
            RouteMatch::Preflight
        ));
    }

    #[test]
    fn test_unknown_path() {
        assert!(matches!(
            match_route(&Method::GET, "/v2/other"),
            RouteMatch::NotFound
        ));
    }
}
