//! Webhook acknowledgement DTO.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for an accepted webhook delivery.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    /// Always `true`; no payment data is echoed.
    pub received: bool,
}
