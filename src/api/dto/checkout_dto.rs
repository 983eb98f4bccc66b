//! Checkout DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::clients::CheckoutLink;

/// Request body for `POST /checkout`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutSessionRequest {
    /// Website the plan is bought for.
    #[serde(default)]
    pub website: Option<String>,
    /// Email to prefill on the hosted page.
    #[serde(default)]
    pub email: Option<String>,
    /// Page language (`en` or `pt`).
    #[serde(default)]
    pub lang: Option<String>,
}

/// Response body for `POST /checkout`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    /// Checkout session identifier.
    pub session_id: String,
    /// Hosted checkout page to redirect to.
    pub url: Option<String>,
}

impl From<CheckoutLink> for CheckoutSessionResponse {
    fn from(link: CheckoutLink) -> Self {
        Self {
            session_id: link.id,
            url: link.url,
        }
    }
}
