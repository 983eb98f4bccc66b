//! Upsell checkout session creation.

use std::sync::Arc;

use crate::clients::{CheckoutError, CheckoutLink, CheckoutProvider, CheckoutRequest};
use crate::domain::Lang;

/// Creates hosted checkout sessions for the optimization plan.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    provider: Arc<dyn CheckoutProvider>,
    price_cents: u64,
    site_url: String,
}

impl CheckoutService {
    /// Creates a new `CheckoutService` selling at `price_cents`.
    #[must_use]
    pub fn new(provider: Arc<dyn CheckoutProvider>, price_cents: u64, site_url: impl Into<String>) -> Self {
        Self {
            provider,
            price_cents,
            site_url: site_url.into(),
        }
    }

    /// Opens a checkout session. Blank `website` or `email` values are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the provider call fails.
    pub async fn create(
        &self,
        website: Option<&str>,
        email: Option<&str>,
        lang: Lang,
    ) -> Result<CheckoutLink, CheckoutError> {
        let request = CheckoutRequest {
            website: non_blank(website),
            email: non_blank(email),
            lang,
            price_cents: self.price_cents,
            site_url: self.site_url.clone(),
        };

        let link = self.provider.create_session(&request).await?;
        tracing::info!(session_id = %link.id, lang = lang.code(), "checkout session created");
        Ok(link)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingProvider {
        requests: Mutex<Vec<CheckoutRequest>>,
    }

    #[async_trait]
    impl CheckoutProvider for RecordingProvider {
        async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutLink, CheckoutError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            Ok(CheckoutLink {
                id: "cs_test_1".to_string(),
                url: Some("https://checkout.stripe.com/c/pay/cs_test_1".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn builds_request_from_config() {
        let provider = Arc::new(RecordingProvider::default());
        let service = CheckoutService::new(
            Arc::clone(&provider) as Arc<dyn CheckoutProvider>,
            19_700,
            "https://site.io",
        );

        let Ok(link) = service.create(Some("acme.io"), Some("  "), Lang::Pt).await else {
            panic!("checkout should succeed");
        };
        assert_eq!(link.id, "cs_test_1");

        let Ok(requests) = provider.requests.lock() else {
            panic!("lock poisoned");
        };
        let Some(request) = requests.first() else {
            panic!("provider should be called");
        };
        assert_eq!(request.website.as_deref(), Some("acme.io"));
        assert_eq!(request.email, None);
        assert_eq!(request.price_cents, 19_700);
        assert_eq!(request.lang, Lang::Pt);
    }

    #[tokio::test]
    async fn unconfigured_provider_fails() {
        let Ok(client) = crate::clients::StripeCheckoutClient::new(None, std::time::Duration::from_secs(1)) else {
            panic!("client should build");
        };
        let service = CheckoutService::new(Arc::new(client), 100, "https://site.io");
        assert!(matches!(
            service.create(None, None, Lang::En).await,
            Err(CheckoutError::NotConfigured)
        ));
    }
}
