//! Request handling for the `/api/gec` and `/healthCheck` routes, independent
//! of any HTTP server. A transport passes in the method, path, content type
//! and body and writes back the returned status, headers and body.

use crate::error::GecError;
use crate::pipeline::Corrector;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, warn};

pub const GEC_ROUTE: &str = "/api/gec";
pub const HEALTH_ROUTE: &str = "/healthCheck";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GecRequest {
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    fn new(status: StatusCode, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let mut headers: Vec<(String, String)> = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, Some("text/plain; charset=utf-8"), body)
    }

    fn json(body: String) -> Self {
        Self::new(StatusCode::OK, Some("application/json"), body)
    }

    fn empty(status: StatusCode) -> Self {
        Self::new(status, None, String::new())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn handle(
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &[u8],
    corrector: &Corrector,
) -> ApiResponse {
    debug!("{} {}", method, path);

    match (path, method.to_ascii_uppercase().as_str()) {
        (_, "OPTIONS") if path == GEC_ROUTE || path == HEALTH_ROUTE => {
            ApiResponse::empty(StatusCode::OK)
        }
        (GEC_ROUTE, "POST") => handle_gec(content_type, body, corrector),
        (HEALTH_ROUTE, "GET") => ApiResponse::text(StatusCode::OK, "ok"),
        (GEC_ROUTE, _) | (HEALTH_ROUTE, _) => {
            ApiResponse::text(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        }
        _ => ApiResponse::text(StatusCode::NOT_FOUND, "not found"),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

fn handle_gec(content_type: Option<&str>, body: &[u8], corrector: &Corrector) -> ApiResponse {
    if !is_json(content_type) {
        return ApiResponse::text(
            StatusCode::BAD_REQUEST,
            "Content-Type must be application/json",
        );
    }

    let request: GecRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejecting malformed request: {}", e);
            return ApiResponse::text(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e));
        }
    };

    if request.text.trim().is_empty() {
        return ApiResponse::text(StatusCode::BAD_REQUEST, "text must not be empty");
    }

    match corrector.markup(&request.text) {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(body) => ApiResponse::json(body),
            Err(e) => {
                error!("Failed to encode response: {}", e);
                ApiResponse::text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Markup failed: {}", e);
            }
            ApiResponse::text(status, e.to_string())
        }
    }
}

pub fn status_for(error: &GecError) -> StatusCode {
    match error {
        GecError::EmptyText | GecError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GecError::NoCapacity => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
