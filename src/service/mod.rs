//! Service layer: business logic orchestration.
//!
//! [`PaymentIngestor`] applies verified payment events, [`VisibilityService`]
//! produces normalized visibility reports, [`OnboardingService`] and
//! [`CheckoutService`] cover the rest of the purchase flow. Detached side
//! effects go through [`BackgroundTasks`].

pub mod background;
pub mod checkout_service;
pub mod onboarding_service;
pub mod payment_ingestor;
pub mod prompts;
pub mod score_normalizer;
pub mod visibility_service;

pub use background::BackgroundTasks;
pub use checkout_service::CheckoutService;
pub use onboarding_service::{OnboardingError, OnboardingService, OnboardingSubmission};
pub use payment_ingestor::{IngestError, IngestOutcome, PaymentIngestor};
pub use visibility_service::VisibilityService;
