//! Optional analytics sink (e.g. a spreadsheet webhook).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::domain::VisibilityStatus;

/// One row describing a completed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsEntry {
    /// Analyzed website.
    pub website: String,
    /// Visitor email.
    pub email: String,
    /// Resulting tier.
    pub status: VisibilityStatus,
    /// Resulting overall score.
    pub overall_score: u8,
    /// When the analysis finished.
    pub timestamp: DateTime<Utc>,
}

/// Analytics delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("analytics sink returned status {0}")]
    Status(u16),
}

/// Records analyses somewhere outside the service.
#[async_trait]
pub trait AnalyticsSink: Send + Sync + std::fmt::Debug {
    /// Records one entry.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalyticsError`] if delivery fails.
    async fn record(&self, entry: &AnalyticsEntry) -> Result<(), AnalyticsError>;
}

/// Posts each entry as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookAnalytics {
    client: Client,
    url: String,
}

impl WebhookAnalytics {
    /// Creates a sink posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: super::http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AnalyticsSink for WebhookAnalytics {
    async fn record(&self, entry: &AnalyticsEntry) -> Result<(), AnalyticsError> {
        let response = self.client.post(&self.url).json(entry).send().await?;
        if !response.status().is_success() {
            return Err(AnalyticsError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
