//! Hosted checkout session creation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::Lang;

const STRIPE_CHECKOUT_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Product name shown on the hosted checkout page.
pub const PRODUCT_NAME: &str = "AI Visibility Optimization Plan";

const PRODUCT_DESCRIPTION: &str = "Complete AI visibility optimization with detailed analysis, \
competitive gap analysis, structured data roadmap, and implementation guidance.";

/// What to sell and where to send the customer afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Website the plan is for; stored as session metadata.
    pub website: Option<String>,
    /// Prefilled customer email, if the visitor gave one.
    pub email: Option<String>,
    /// Visitor language, selects redirect paths.
    pub lang: Lang,
    /// Price in cents (USD).
    pub price_cents: u64,
    /// Public base URL of the landing page.
    pub site_url: String,
}

impl CheckoutRequest {
    /// Where the hosted page redirects after payment.
    #[must_use]
    pub fn success_url(&self) -> String {
        format!(
            "{}/{}/onboarding?session_id={{CHECKOUT_SESSION_ID}}",
            self.site_url,
            self.lang.code()
        )
    }

    /// Where the hosted page redirects when the customer cancels.
    #[must_use]
    pub fn cancel_url(&self) -> String {
        format!("{}/{}/results", self.site_url, self.lang.code())
    }

    /// Form fields of the session creation call.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", self.price_cents.to_string()),
            ("line_items[0][price_data][product_data][name]", PRODUCT_NAME.to_string()),
            (
                "line_items[0][price_data][product_data][description]",
                PRODUCT_DESCRIPTION.to_string(),
            ),
            ("success_url", self.success_url()),
            ("cancel_url", self.cancel_url()),
            ("metadata[website]", self.website.clone().unwrap_or_default()),
            ("metadata[email]", self.email.clone().unwrap_or_default()),
            ("metadata[lang]", self.lang.code().to_string()),
        ];
        if let Some(email) = &self.email {
            fields.push(("customer_email", email.clone()));
        }
        fields
    }
}

/// A created hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutLink {
    /// Session identifier.
    pub id: String,
    /// Hosted page URL to redirect the visitor to.
    pub url: Option<String>,
}

/// Checkout creation failures.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// No secret key was configured.
    #[error("checkout provider is not configured")]
    NotConfigured,

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("checkout provider error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },
}

/// Creates hosted checkout sessions.
#[async_trait]
pub trait CheckoutProvider: Send + Sync + std::fmt::Debug {
    /// Creates a session for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the provider call fails.
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutLink, CheckoutError>;
}

/// Stripe Checkout Sessions API client.
#[derive(Clone)]
pub struct StripeCheckoutClient {
    client: Client,
    secret_key: Option<String>,
}

impl std::fmt::Debug for StripeCheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeCheckoutClient")
            .field("configured", &self.secret_key.is_some())
            .finish_non_exhaustive()
    }
}

impl StripeCheckoutClient {
    /// Creates a client. Without a secret key every call fails with
    /// [`CheckoutError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Http`] if the HTTP client cannot be built.
    pub fn new(secret_key: Option<String>, timeout: Duration) -> Result<Self, CheckoutError> {
        Ok(Self {
            client: super::http_client(timeout)?,
            secret_key,
        })
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutClient {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutLink, CheckoutError> {
        let key = self.secret_key.as_deref().ok_or(CheckoutError::NotConfigured)?;

        let response = self
            .client
            .post(STRIPE_CHECKOUT_URL)
            .bearer_auth(key)
            .form(&request.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}
