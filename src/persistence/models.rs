//! Database row model for the `payments` table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::StoreError;
use crate::domain::{PaymentId, PaymentRecord, PaymentStatus};

/// A row of the `payments` table as returned by `sqlx`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    /// Primary key.
    pub id: Uuid,
    /// Customer email.
    pub customer_email: String,
    /// Optional website.
    pub website: Option<String>,
    /// Unique provider payment id.
    pub stripe_payment_id: String,
    /// Status label (see [`PaymentStatus::as_str`]).
    pub status: String,
    /// Payment confirmation time.
    pub payment_timestamp: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status: PaymentStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("payment {}: {e}", row.id)))?;
        Ok(Self {
            id: PaymentId::from_uuid(row.id),
            customer_email: row.customer_email,
            website: row.website,
            stripe_payment_id: row.stripe_payment_id,
            status,
            payment_timestamp: row.payment_timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
