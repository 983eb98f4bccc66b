//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::api::origin::OriginPolicy;
use crate::clients::SignatureVerifier;
use crate::service::{
    BackgroundTasks, CheckoutService, OnboardingService, PaymentIngestor, VisibilityService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Webhook verifier; `None` when no webhook secret is configured.
    pub verifier: Option<Arc<dyn SignatureVerifier>>,
    /// Payment event ingestion.
    pub ingestor: Arc<PaymentIngestor>,
    /// Visibility analysis.
    pub visibility: Arc<VisibilityService>,
    /// Checkout session creation.
    pub checkout: Arc<CheckoutService>,
    /// Onboarding completion.
    pub onboarding: Arc<OnboardingService>,
    /// Origin allow-list of the visibility test endpoint.
    pub origins: Arc<OriginPolicy>,
    /// Detached side effects, drained on shutdown.
    pub tasks: BackgroundTasks,
}
