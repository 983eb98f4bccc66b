//! Origin allow-list for browser-facing endpoints.
//!
//! The visibility test triggers a paid reasoning call, so it is only served
//! to pages on the allow-list. The gate runs as an extractor, before the
//! body is read.

use axum::extract::FromRequestParts;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ORIGIN, REFERER,
};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::app_state::AppState;
use crate::error::ApiError;

/// Methods advertised to allowed origins.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Request headers advertised to allowed origins.
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE_SECS: u32 = 86_400;

/// Origins allowed to call browser-facing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Creates a policy from origin prefixes such as
    /// `https://www.example.com`.
    #[must_use]
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Returns `true` if `value` starts with an allowed origin.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.allowed.iter().any(|allowed| value.starts_with(allowed.as_str()))
    }

    /// Accepts a request whose `Origin` header, or failing that whose
    /// `Referer` header, starts with an allowed origin.
    #[must_use]
    pub fn is_allowed(&self, headers: &HeaderMap) -> bool {
        [ORIGIN, REFERER]
            .iter()
            .filter_map(|name| headers.get(name).and_then(|v| v.to_str().ok()))
            .any(|value| self.matches(value))
    }

    /// The `Origin` header value if it is itself allowed.
    #[must_use]
    pub fn allowed_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        headers
            .get(ORIGIN)
            .filter(|v| v.to_str().is_ok_and(|origin| self.matches(origin)))
            .cloned()
    }

    /// A `tower-http` CORS layer answering for the same origins.
    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        let policy = self.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin, _| {
                origin.to_str().is_ok_and(|origin| policy.matches(origin))
            }))
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}

/// Extractor that rejects requests from origins off the allow-list with
/// `403 Origin not allowed`. Holds the `Origin` to echo back, if any.
#[derive(Debug, Clone)]
pub struct AllowedOrigin(pub Option<HeaderValue>);

impl FromRequestParts<AppState> for AllowedOrigin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !state.origins.is_allowed(&parts.headers) {
            tracing::warn!(
                origin = ?parts.headers.get(ORIGIN),
                referer = ?parts.headers.get(REFERER),
                "request from disallowed origin"
            );
            return Err(ApiError::OriginNotAllowed);
        }
        Ok(Self(state.origins.allowed_origin(&parts.headers)))
    }
}

impl AllowedOrigin {
    /// CORS response headers for the echoed origin, empty without one.
    #[must_use]
    pub fn cors_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        self.0
            .iter()
            .flat_map(|origin| {
                [
                    (ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone()),
                    (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS)),
                    (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS)),
                ]
            })
            .collect()
    }
}

/// Answers a CORS preflight: `200` with the allow headers for an allowed
/// `Origin`, `403` otherwise.
#[must_use]
pub fn preflight_response(policy: &OriginPolicy, headers: &HeaderMap) -> Response {
    let Some(origin) = policy.allowed_origin(headers) else {
        return ApiError::OriginNotAllowed.into_response();
    };
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, origin),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS)),
            (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS)),
            (ACCESS_CONTROL_MAX_AGE, HeaderValue::from(PREFLIGHT_MAX_AGE_SECS)),
        ],
    )
        .into_response()
}
