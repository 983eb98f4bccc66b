//! Payment records and their forward-only lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PaymentId;

/// Lifecycle stage of a [`PaymentRecord`].
///
/// The variants are declared in lifecycle order; `Ord` follows that order
/// and a record may only ever move to a strictly later stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment confirmed, no onboarding notification dispatched yet.
    Paid,
    /// Onboarding notification dispatch was attempted.
    OnboardingSent,
    /// The customer submitted the onboarding form.
    OnboardingCompleted,
    /// Onboarding data accepted, work can start.
    ReadyForOptimization,
}

impl PaymentStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Paid,
        Self::OnboardingSent,
        Self::OnboardingCompleted,
        Self::ReadyForOptimization,
    ];

    /// Returns the snake_case label stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::OnboardingSent => "onboarding_sent",
            Self::OnboardingCompleted => "onboarding_completed",
            Self::ReadyForOptimization => "ready_for_optimization",
        }
    }

    /// Returns `true` if a record in `self` may move to `next`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }

    /// Statuses from which a record may advance to `self`.
    #[must_use]
    pub fn predecessors(self) -> Vec<Self> {
        Self::ALL.into_iter().filter(|s| *s < self).collect()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One purchase attempt and its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Internal record identifier.
    pub id: PaymentId,
    /// Customer email captured at checkout.
    pub customer_email: String,
    /// Website the customer purchased the plan for, if known.
    pub website: Option<String>,
    /// Provider payment identifier; unique across all records.
    pub stripe_payment_id: String,
    /// Current lifecycle stage.
    pub status: PaymentStatus,
    /// When the payment was recorded as confirmed.
    pub payment_timestamp: DateTime<Utc>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a fresh [`PaymentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Customer email.
    pub customer_email: String,
    /// Optional website.
    pub website: Option<String>,
    /// Idempotency key.
    pub stripe_payment_id: String,
}

impl NewPayment {
    /// Materializes the record as it is stored on first insert: status
    /// [`PaymentStatus::Paid`] and all timestamps set to `now`.
    #[must_use]
    pub fn into_record(self, now: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord {
            id: PaymentId::new(),
            customer_email: self.customer_email,
            website: self.website,
            stripe_payment_id: self.stripe_payment_id,
            status: PaymentStatus::Paid,
            payment_timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_only_move_forward() {
        assert!(PaymentStatus::Paid.can_advance_to(PaymentStatus::OnboardingSent));
        assert!(PaymentStatus::Paid.can_advance_to(PaymentStatus::OnboardingCompleted));
        assert!(!PaymentStatus::OnboardingSent.can_advance_to(PaymentStatus::Paid));
        assert!(!PaymentStatus::OnboardingSent.can_advance_to(PaymentStatus::OnboardingSent));
    }

    #[test]
    fn predecessors_of_completed() {
        assert_eq!(
            PaymentStatus::OnboardingCompleted.predecessors(),
            vec![PaymentStatus::Paid, PaymentStatus::OnboardingSent]
        );
        assert!(PaymentStatus::Paid.predecessors().is_empty());
    }

    #[test]
    fn labels_parse_back() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn serde_uses_database_labels() {
        let json = serde_json::to_string(&PaymentStatus::ReadyForOptimization).ok();
        assert_eq!(json.as_deref(), Some("\"ready_for_optimization\""));
    }

    #[test]
    fn new_payment_starts_paid() {
        let now = Utc::now();
        let record = NewPayment {
            customer_email: "a@b.com".to_string(),
            website: None,
            stripe_payment_id: "pi_123".to_string(),
        }
        .into_record(now);
        assert_eq!(record.status, PaymentStatus::Paid);
        assert_eq!(record.created_at, now);
        assert_eq!(record.payment_timestamp, now);
    }
}
