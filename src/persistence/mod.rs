//! Persistence layer: durable payment records.
//!
//! [`PaymentStore`] is the capability the services depend on. The concrete
//! implementations are [`postgres::PostgresPaymentStore`] (`sqlx::PgPool`)
//! and [`memory::MemoryPaymentStore`]. Both enforce uniqueness of the
//! provider payment id and report violations as [`StoreError::Conflict`].

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{NewPayment, PaymentId, PaymentRecord, PaymentStatus};

pub use memory::MemoryPaymentStore;
pub use postgres::PostgresPaymentStore;

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with the same provider payment id already exists.
    #[error("payment {0} already recorded")]
    Conflict(String),

    /// A stored row could not be mapped back into a record.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Durable storage of [`PaymentRecord`]s.
#[async_trait]
pub trait PaymentStore: Send + Sync + std::fmt::Debug {
    /// Looks up the record for a provider payment id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    async fn find_by_stripe_payment_id(
        &self,
        stripe_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Returns the most recently created record for an email.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    async fn find_latest_by_email(&self, email: &str) -> Result<Option<PaymentRecord>, StoreError>;

    /// Inserts a new record with status [`PaymentStatus::Paid`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the provider payment id is
    /// already taken, [`StoreError::Backend`] on any other failure.
    async fn insert(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError>;

    /// Moves a record forward to `status`, optionally replacing its website.
    ///
    /// The update only applies while the record is in one of the statuses
    /// preceding `status`; `Ok(None)` means no such record matched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    async fn advance_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        website: Option<&str>,
    ) -> Result<Option<PaymentRecord>, StoreError>;
}
