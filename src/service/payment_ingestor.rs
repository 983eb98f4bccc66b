//! Payment event ingestion.
//!
//! Webhook deliveries are at-least-once and may arrive concurrently. The
//! store's uniqueness constraint on the provider payment id is the only
//! thing deciding which delivery creates the record; every other delivery
//! of the same payment resolves to [`IngestOutcome::AlreadyRecorded`].

use std::sync::Arc;

use super::background::BackgroundTasks;
use crate::clients::Notifier;
use crate::clients::email::onboarding_email;
use crate::domain::payment_event::{CHECKOUT_SESSION_COMPLETED, PAYMENT_INTENT_SUCCEEDED};
use crate::domain::{CheckoutSession, NewPayment, PaymentEvent, PaymentRecord, PaymentStatus};
use crate::persistence::{PaymentStore, StoreError};

/// Result of ingesting one verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// This delivery created the record.
    Recorded(PaymentRecord),
    /// The payment was already recorded; nothing changed.
    AlreadyRecorded(PaymentRecord),
    /// The event requires no state change.
    Ignored,
}

/// Failures of a verified event that must be reported to the sender.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A paid session carried no usable customer email.
    #[error("checkout session {0} has no customer email")]
    MissingCustomerEmail(String),

    /// The event object is not a checkout session.
    #[error("malformed checkout session: {0}")]
    MalformedSession(#[from] serde_json::Error),

    /// The primary insert or lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies verified payment events to the payment store.
#[derive(Debug, Clone)]
pub struct PaymentIngestor {
    store: Arc<dyn PaymentStore>,
    notifier: Arc<dyn Notifier>,
    tasks: BackgroundTasks,
    site_url: String,
}

impl PaymentIngestor {
    /// Creates a new `PaymentIngestor`.
    #[must_use]
    pub fn new(
        store: Arc<dyn PaymentStore>,
        notifier: Arc<dyn Notifier>,
        tasks: BackgroundTasks,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            tasks,
            site_url: site_url.into(),
        }
    }

    /// Ingests one verified event.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] if a paid checkout session cannot be
    /// recorded. Failures after the record exists are logged instead.
    pub async fn ingest(&self, event: &PaymentEvent) -> Result<IngestOutcome, IngestError> {
        match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                let session: CheckoutSession = serde_json::from_value(event.data.object.clone())?;
                self.ingest_checkout(&session).await
            }
            PAYMENT_INTENT_SUCCEEDED => {
                tracing::info!(event_id = %event.id, "payment intent succeeded");
                Ok(IngestOutcome::Ignored)
            }
            other => {
                tracing::debug!(event_id = %event.id, event_type = other, "unhandled event type");
                Ok(IngestOutcome::Ignored)
            }
        }
    }

    async fn ingest_checkout(&self, session: &CheckoutSession) -> Result<IngestOutcome, IngestError> {
        if !session.is_paid() {
            tracing::info!(
                session_id = %session.id,
                payment_status = ?session.payment_status,
                "checkout completed without payment, ignoring"
            );
            return Ok(IngestOutcome::Ignored);
        }

        let email = session
            .email()
            .ok_or_else(|| IngestError::MissingCustomerEmail(session.id.clone()))?;
        let key = session.idempotency_key();

        if let Some(existing) = self.store.find_by_stripe_payment_id(key).await? {
            tracing::info!(payment_id = %existing.id, key, "payment already recorded");
            return Ok(IngestOutcome::AlreadyRecorded(existing));
        }

        let new_payment = NewPayment {
            customer_email: email.to_string(),
            website: session.website().map(str::to_string),
            stripe_payment_id: key.to_string(),
        };

        let record = match self.store.insert(new_payment).await {
            Ok(record) => record,
            Err(StoreError::Conflict(_)) => {
                // A concurrent delivery inserted first.
                return match self.store.find_by_stripe_payment_id(key).await? {
                    Some(existing) => {
                        tracing::info!(payment_id = %existing.id, key, "lost insert race, payment already recorded");
                        Ok(IngestOutcome::AlreadyRecorded(existing))
                    }
                    None => Err(StoreError::Backend(format!(
                        "payment {key} conflicted but could not be read back"
                    ))
                    .into()),
                };
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(payment_id = %record.id, key, "payment recorded");

        let message = onboarding_email(&self.site_url, email, record.website.as_deref());
        let notifier = Arc::clone(&self.notifier);
        self.tasks
            .spawn("onboarding email", async move { notifier.send(message).await });

        match self
            .store
            .advance_status(record.id, PaymentStatus::OnboardingSent, None)
            .await
        {
            Ok(Some(updated)) => Ok(IngestOutcome::Recorded(updated)),
            Ok(None) => {
                tracing::warn!(payment_id = %record.id, "record moved on before onboarding_sent");
                Ok(IngestOutcome::Recorded(record))
            }
            Err(e) => {
                tracing::error!(payment_id = %record.id, error = %e, "failed to mark onboarding sent");
                Ok(IngestOutcome::Recorded(record))
            }
        }
    }
}
