//! Payment provider webhook handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::WebhookAck;
use crate::app_state::AppState;
use crate::clients::signature::SIGNATURE_HEADER;
use crate::error::{ApiError, ErrorResponse};
use crate::service::IngestOutcome;

/// `POST /webhooks/stripe`: Ingest a signed payment event.
///
/// The signature is checked against the raw body bytes before anything is
/// parsed. Repeated deliveries of the same payment are acknowledged
/// without creating a second record.
///
/// # Errors
///
/// Returns [`ApiError`] if the signature is missing or invalid, no webhook
/// secret is configured, or the event cannot be recorded.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/stripe",
    tag = "Payments",
    summary = "Payment provider webhook",
    description = "Verifies the `Stripe-Signature` header over the raw body and records paid checkout sessions exactly once.",
    request_body(content = String, description = "Raw signed event payload", content_type = "application/json"),
    params(
        ("stripe-signature" = String, Header, description = "`t=<unix ts>,v1=<hex hmac>`"),
    ),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Missing or invalid signature", body = ErrorResponse),
        (status = 500, description = "Webhook secret missing or processing failed", body = ErrorResponse),
    )
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;

    let verifier = state
        .verifier
        .as_ref()
        .ok_or(ApiError::WebhookNotConfigured)?;

    let event = verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!(error = %e, "webhook signature rejected");
        ApiError::from(e)
    })?;

    match state.ingestor.ingest(&event).await? {
        IngestOutcome::Recorded(record) => {
            tracing::info!(event_id = %event.id, payment_id = %record.id, "webhook recorded payment");
        }
        IngestOutcome::AlreadyRecorded(record) => {
            tracing::info!(event_id = %event.id, payment_id = %record.id, "duplicate webhook delivery");
        }
        IngestOutcome::Ignored => {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "webhook acknowledged");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}
