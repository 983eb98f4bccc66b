//! Post-payment onboarding completion.

use std::sync::Arc;

use crate::domain::{PaymentRecord, PaymentStatus};
use crate::persistence::{PaymentStore, StoreError};

/// Answers submitted on the onboarding form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingSubmission {
    /// Email used at checkout; identifies the payment.
    pub email: String,
    /// Website to optimize.
    pub website: String,
    /// What the business sells.
    pub primary_services: String,
    /// Main city served.
    pub target_city: String,
    /// Optional competitor list, free text.
    pub competitors: Option<String>,
}

/// Onboarding failures.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// No payment was ever recorded for the email.
    #[error("no payment found for {0}")]
    PaymentNotFound(String),

    /// The payment already went through onboarding.
    #[error("onboarding already completed for payment {0}")]
    AlreadyCompleted(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Advances a customer's latest payment through onboarding.
#[derive(Debug, Clone)]
pub struct OnboardingService {
    store: Arc<dyn PaymentStore>,
}

impl OnboardingService {
    /// Creates a new `OnboardingService`.
    #[must_use]
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Records the submitted website and moves the customer's latest
    /// payment to [`PaymentStatus::OnboardingCompleted`], then to
    /// [`PaymentStatus::ReadyForOptimization`]. A failure of the second
    /// step is logged and the completed record returned.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::PaymentNotFound`] for an unknown email,
    /// [`OnboardingError::AlreadyCompleted`] if the payment is past
    /// onboarding, and [`OnboardingError::Store`] if the first update fails.
    pub async fn complete(
        &self,
        submission: &OnboardingSubmission,
    ) -> Result<PaymentRecord, OnboardingError> {
        let payment = self
            .store
            .find_latest_by_email(&submission.email)
            .await?
            .ok_or_else(|| OnboardingError::PaymentNotFound(submission.email.clone()))?;

        let completed = self
            .store
            .advance_status(
                payment.id,
                PaymentStatus::OnboardingCompleted,
                Some(&submission.website),
            )
            .await?
            .ok_or_else(|| OnboardingError::AlreadyCompleted(payment.id.to_string()))?;

        tracing::info!(
            payment_id = %completed.id,
            website = %submission.website,
            primary_services = %submission.primary_services,
            target_city = %submission.target_city,
            has_competitors = submission.competitors.is_some(),
            "onboarding completed"
        );

        match self
            .store
            .advance_status(completed.id, PaymentStatus::ReadyForOptimization, None)
            .await
        {
            Ok(Some(ready)) => Ok(ready),
            Ok(None) => Ok(completed),
            Err(e) => {
                tracing::error!(payment_id = %completed.id, error = %e, "failed to mark ready for optimization");
                Ok(completed)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewPayment;
    use crate::persistence::MemoryPaymentStore;

    fn submission(email: &str) -> OnboardingSubmission {
        OnboardingSubmission {
            email: email.to_string(),
            website: "https://acme.io".to_string(),
            primary_services: "Bread".to_string(),
            target_city: "Porto".to_string(),
            competitors: None,
        }
    }

    async fn seeded_store() -> Arc<MemoryPaymentStore> {
        let store = Arc::new(MemoryPaymentStore::new());
        let Ok(_) = store
            .insert(NewPayment {
                customer_email: "owner@acme.io".to_string(),
                website: None,
                stripe_payment_id: "pi_1".to_string(),
            })
            .await
        else {
            panic!("insert should succeed");
        };
        store
    }

    #[tokio::test]
    async fn completes_and_readies_payment() {
        let store = seeded_store().await;
        let service = OnboardingService::new(Arc::clone(&store) as Arc<dyn PaymentStore>);

        let Ok(record) = service.complete(&submission("owner@acme.io")).await else {
            panic!("onboarding should succeed");
        };
        assert_eq!(record.status, PaymentStatus::ReadyForOptimization);
        assert_eq!(record.website.as_deref(), Some("https://acme.io"));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let store = seeded_store().await;
        let service = OnboardingService::new(store);

        let Err(OnboardingError::PaymentNotFound(email)) =
            service.complete(&submission("nobody@acme.io")).await
        else {
            panic!("unknown email must be not found");
        };
        assert_eq!(email, "nobody@acme.io");
    }

    #[tokio::test]
    async fn second_submission_does_not_move_backwards() {
        let store = seeded_store().await;
        let service = OnboardingService::new(Arc::clone(&store) as Arc<dyn PaymentStore>);

        let Ok(_) = service.complete(&submission("owner@acme.io")).await else {
            panic!("first submission should succeed");
        };
        assert!(matches!(
            service.complete(&submission("owner@acme.io")).await,
            Err(OnboardingError::AlreadyCompleted(_))
        ));

        let Ok(Some(record)) = store.find_by_stripe_payment_id("pi_1").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, PaymentStatus::ReadyForOptimization);
    }
}
