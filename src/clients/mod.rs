//! Outbound collaborators: payment provider, reasoning service, email and
//! analytics.
//!
//! Each capability is a trait so services receive it injected at
//! construction time and tests can substitute in-memory doubles.

pub mod analytics;
pub mod checkout;
pub mod email;
pub mod notifier;
pub mod reasoning;
pub mod signature;

use std::time::Duration;

pub use analytics::{AnalyticsEntry, AnalyticsError, AnalyticsSink, WebhookAnalytics};
pub use checkout::{CheckoutError, CheckoutLink, CheckoutProvider, CheckoutRequest, StripeCheckoutClient};
pub use email::OutgoingEmail;
pub use notifier::{LogNotifier, Notifier, NotifyError, ResendNotifier};
pub use reasoning::{OpenAiClient, ReasoningError, ReasoningService};
pub use signature::{SignatureError, SignatureVerifier, StripeSignatureVerifier};

/// Builds the shared `reqwest` client configuration used by every
/// outbound collaborator.
fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
