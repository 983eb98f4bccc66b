//! Visibility test handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{VisibilityTestRequest, VisibilityTestResponse};
use crate::api::origin::{AllowedOrigin, preflight_response};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /visibility-test`: Analyze a website's AI visibility.
///
/// Only served to allow-listed origins. The report is always well formed:
/// reasoning failures produce the fallback report, not an error. The
/// result email and analytics entry are sent after the response.
///
/// # Errors
///
/// Returns [`ApiError`] for a disallowed origin or an invalid body.
#[utoipa::path(
    post,
    path = "/api/v1/visibility-test",
    tag = "Visibility",
    summary = "Run a visibility test",
    description = "Scores how clearly AI assistants understand the business behind a website. Requests must come from an allowed Origin or Referer.",
    request_body = VisibilityTestRequest,
    responses(
        (status = 200, description = "Report produced", body = VisibilityTestResponse),
        (status = 400, description = "Missing website/email or invalid email", body = ErrorResponse),
        (status = 403, description = "Origin not allowed", body = ErrorResponse),
    )
)]
pub async fn visibility_test(
    State(state): State<AppState>,
    origin: AllowedOrigin,
    payload: Result<Json<VisibilityTestRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let test = request.validate()?;

    let report = state
        .visibility
        .run_test(&test.website, &test.email, test.lang)
        .await;

    let body = VisibilityTestResponse {
        success: true,
        message: "Test submitted successfully".to_string(),
        website: test.website,
        report,
    };
    Ok((AppendHeaders(origin.cors_headers()), Json(body)).into_response())
}

/// `OPTIONS /visibility-test`: CORS preflight.
#[utoipa::path(
    options,
    path = "/api/v1/visibility-test",
    tag = "Visibility",
    summary = "CORS preflight",
    responses(
        (status = 200, description = "Origin allowed"),
        (status = 403, description = "Origin not allowed", body = ErrorResponse),
    )
)]
pub async fn visibility_preflight(State(state): State<AppState>, headers: HeaderMap) -> Response {
    preflight_response(&state.origins, &headers)
}

/// Visibility routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/visibility-test",
        post(visibility_test).options(visibility_preflight),
    )
}
