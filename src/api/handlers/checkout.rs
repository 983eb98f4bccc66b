//! Checkout session handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CheckoutSessionRequest, CheckoutSessionResponse};
use crate::app_state::AppState;
use crate::domain::Lang;
use crate::error::{ApiError, ErrorResponse};

/// `POST /checkout`: Open a hosted checkout session for the plan.
///
/// # Errors
///
/// Returns [`ApiError`] on an invalid body or if the provider fails.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    tag = "Payments",
    summary = "Create checkout session",
    description = "Creates a hosted checkout session for the optimization plan and returns the page to redirect to.",
    request_body = CheckoutSessionRequest,
    responses(
        (status = 200, description = "Session created", body = CheckoutSessionResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Checkout provider failure", body = ErrorResponse),
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let link = state
        .checkout
        .create(
            request.website.as_deref(),
            request.email.as_deref(),
            Lang::from_code(request.lang.as_deref()),
        )
        .await?;

    Ok(Json(CheckoutSessionResponse::from(link)))
}

/// Checkout routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(create_checkout))
}
