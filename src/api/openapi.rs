//! OpenAPI document served by Swagger UI.

use utoipa::OpenApi;

use crate::api::dto::{
    CheckoutSessionRequest, CheckoutSessionResponse, OnboardingRequest, OnboardingResponse,
    VisibilityTestRequest, VisibilityTestResponse, WebhookAck,
};
use crate::api::handlers::{checkout, onboarding, system, visibility, webhook};
use crate::domain::{PaymentStatus, Pillar, VisibilityReport, VisibilityStatus};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "clarity-gateway", description = "AI visibility test, checkout and payment webhooks"),
    paths(
        system::health_handler,
        webhook::stripe_webhook,
        visibility::visibility_test,
        visibility::visibility_preflight,
        checkout::create_checkout,
        onboarding::complete_onboarding,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        WebhookAck,
        VisibilityTestRequest,
        VisibilityTestResponse,
        VisibilityReport,
        VisibilityStatus,
        Pillar,
        CheckoutSessionRequest,
        CheckoutSessionResponse,
        OnboardingRequest,
        OnboardingResponse,
        PaymentStatus,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Payments", description = "Checkout, webhooks and onboarding"),
        (name = "Visibility", description = "AI visibility test"),
    )
)]
pub struct ApiDoc;
