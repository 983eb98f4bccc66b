//! In-process payment store.
//!
//! Used when `PERSISTENCE_ENABLED=false` and as the store in tests. Records
//! live in a single `RwLock<HashMap>` keyed by provider payment id, so the
//! uniqueness rule of the SQL table holds here as well.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PaymentStore, StoreError};
use crate::domain::{NewPayment, PaymentId, PaymentRecord, PaymentStatus};

/// Payment store backed by process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryPaymentStore {
    records: RwLock<HashMap<String, PaymentRecord>>,
}

impl MemoryPaymentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn find_by_stripe_payment_id(
        &self,
        stripe_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.records.read().await.get(stripe_payment_id).cloned())
    }

    async fn find_latest_by_email(&self, email: &str) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.customer_email == email)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let mut map = self.records.write().await;
        if map.contains_key(&payment.stripe_payment_id) {
            return Err(StoreError::Conflict(payment.stripe_payment_id));
        }
        let record = payment.into_record(Utc::now());
        map.insert(record.stripe_payment_id.clone(), record.clone());
        Ok(record)
    }

    async fn advance_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        website: Option<&str>,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let mut map = self.records.write().await;
        let Some(record) = map
            .values_mut()
            .find(|r| r.id == id && r.status.can_advance_to(status))
        else {
            return Ok(None);
        };
        record.status = status;
        if let Some(website) = website {
            record.website = Some(website.to_string());
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }
}
