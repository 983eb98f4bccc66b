//! Transactional email delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::email::OutgoingEmail;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the message.
    #[error("email provider rejected message (status {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },
}

/// Sends rendered emails.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Delivers one email.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the message could not be handed off.
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError>;
}

/// Notifier used when no email provider is configured: logs and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        tracing::info!(subject = %email.subject, "email delivery disabled, message logged only");
        tracing::debug!(to = %email.to, "undelivered email recipient");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Resend API notifier.
#[derive(Clone)]
pub struct ResendNotifier {
    client: Client,
    api_key: String,
    from: String,
}

impl std::fmt::Debug for ResendNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendNotifier")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl ResendNotifier {
    /// Creates a notifier sending as `from`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        tracing::info!(subject = %email.subject, "email sent");
        tracing::debug!(to = %email.to, "email recipient");
        Ok(())
    }
}
