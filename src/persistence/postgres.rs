//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::PaymentRow;
use super::{PaymentStore, StoreError};
use crate::config::AppConfig;
use crate::domain::{NewPayment, PaymentId, PaymentRecord, PaymentStatus};

const COLUMNS: &str =
    "id, customer_email, website, stripe_payment_id, status, payment_timestamp, created_at, updated_at";

/// PostgreSQL-backed payment store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and applies the bundled
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!("payments database ready");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn find_by_stripe_payment_id(
        &self,
        stripe_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE stripe_payment_id = $1"
        ))
        .bind(stripe_payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_latest_by_email(&self, email: &str) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE customer_email = $1 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn insert(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let key = payment.stripe_payment_id.clone();
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "INSERT INTO payments (id, customer_email, website, stripe_payment_id, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(PaymentId::new().as_uuid())
        .bind(&payment.customer_email)
        .bind(payment.website.as_deref())
        .bind(&payment.stripe_payment_id)
        .bind(PaymentStatus::Paid.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(key),
            other => backend(other),
        })?;

        PaymentRecord::try_from(row)
    }

    async fn advance_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        website: Option<&str>,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let predecessors: Vec<&str> = status
            .predecessors()
            .into_iter()
            .map(PaymentStatus::as_str)
            .collect();

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments SET status = $2, website = COALESCE($4, website), updated_at = now() \
             WHERE id = $1 AND status = ANY($3) RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(&predecessors)
        .bind(website)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PaymentRecord::try_from).transpose()
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
