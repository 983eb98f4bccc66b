//! Onboarding form handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{OnboardingRequest, OnboardingResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /onboarding`: Complete onboarding for a paid customer.
///
/// # Errors
///
/// Returns [`ApiError`] on missing fields, an unknown email, or a failed
/// update.
#[utoipa::path(
    post,
    path = "/api/v1/onboarding",
    tag = "Payments",
    summary = "Complete onboarding",
    description = "Attaches the onboarding answers to the customer's latest payment and moves it to `ready_for_optimization`.",
    request_body = OnboardingRequest,
    responses(
        (status = 200, description = "Onboarding completed", body = OnboardingResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 404, description = "No payment for this email", body = ErrorResponse),
        (status = 409, description = "Onboarding already completed", body = ErrorResponse),
        (status = 500, description = "Update failed", body = ErrorResponse),
    )
)]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    payload: Result<Json<OnboardingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let submission = request.into_submission()?;

    let record = state.onboarding.complete(&submission).await?;
    tracing::info!(payment_id = %record.id, status = %record.status, "onboarding request handled");

    Ok(Json(OnboardingResponse {
        success: true,
        message: "Onboarding completed successfully".to_string(),
    }))
}

/// Onboarding routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/onboarding", post(complete_onboarding))
}
