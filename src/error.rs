//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type of the HTTP boundary. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Server-side failures are logged in full and answered with a generic
//! message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::clients::{CheckoutError, SignatureError};
use crate::service::{IngestError, OnboardingError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "Invalid email format",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`ApiError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | Access          | 403 Forbidden                |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The email does not look like an address.
    #[error("Invalid email format")]
    InvalidEmail,

    /// The webhook arrived without a signature header.
    #[error("Missing stripe-signature header")]
    MissingSignature,

    /// The webhook signature did not verify.
    #[error("Webhook signature verification failed: {0}")]
    InvalidSignature(SignatureError),

    /// No payment is recorded for the email.
    #[error("Payment record not found. Please ensure you have completed payment.")]
    PaymentNotFound(String),

    /// Onboarding was already completed for the payment.
    #[error("Onboarding already completed")]
    OnboardingAlreadyCompleted(String),

    /// The request origin is not on the allow-list.
    #[error("Origin not allowed")]
    OriginNotAllowed,

    /// No webhook secret is configured.
    #[error("Webhook secret not configured")]
    WebhookNotConfigured,

    /// A verified webhook could not be processed.
    #[error("Webhook processing failed")]
    WebhookProcessing(String),

    /// The checkout provider failed.
    #[error("Failed to create checkout session")]
    CheckoutFailed(String),

    /// Persistence layer failure.
    #[error("Failed to update onboarding data")]
    PersistenceError(String),

    /// Internal server error.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidEmail => 1002,
            Self::MissingSignature => 1003,
            Self::InvalidSignature(_) => 1004,
            Self::PaymentNotFound(_) => 2001,
            Self::OnboardingAlreadyCompleted(_) => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::WebhookNotConfigured => 3002,
            Self::WebhookProcessing(_) => 3003,
            Self::CheckoutFailed(_) => 3004,
            Self::OriginNotAllowed => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidEmail
            | Self::MissingSignature
            | Self::InvalidSignature(_) => StatusCode::BAD_REQUEST,
            Self::PaymentNotFound(_) => StatusCode::NOT_FOUND,
            Self::OnboardingAlreadyCompleted(_) => StatusCode::CONFLICT,
            Self::OriginNotAllowed => StatusCode::FORBIDDEN,
            Self::WebhookNotConfigured
            | Self::WebhookProcessing(_)
            | Self::CheckoutFailed(_)
            | Self::PersistenceError(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal detail that is logged but never sent to the client.
    fn detail(&self) -> Option<&str> {
        match self {
            Self::WebhookProcessing(detail)
            | Self::CheckoutFailed(detail)
            | Self::PersistenceError(detail)
            | Self::Internal(detail) => Some(detail),
            _ => None,
        }
    }
}

impl From<SignatureError> for ApiError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::MissingHeader => Self::MissingSignature,
            SignatureError::InvalidSecret => Self::WebhookNotConfigured,
            other => Self::InvalidSignature(other),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self::WebhookProcessing(e.to_string())
    }
}

impl From<OnboardingError> for ApiError {
    fn from(e: OnboardingError) -> Self {
        match e {
            OnboardingError::PaymentNotFound(email) => Self::PaymentNotFound(email),
            OnboardingError::AlreadyCompleted(id) => Self::OnboardingAlreadyCompleted(id),
            OnboardingError::Store(e) => Self::PersistenceError(e.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        Self::CheckoutFailed(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Some(detail) = self.detail() {
            tracing::error!(code = self.error_code(), detail, "{self}");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_ranges() {
        assert_eq!(ApiError::InvalidEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::PaymentNotFound("a@b.com".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::OriginNotAllowed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::WebhookNotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = ApiError::from(IngestError::MissingCustomerEmail("cs_1".to_string()));
        assert_eq!(err.to_string(), "Webhook processing failed");
        assert_eq!(err.error_code(), 3003);

        let err = ApiError::from(CheckoutError::NotConfigured);
        assert_eq!(err.to_string(), "Failed to create checkout session");
    }

    #[test]
    fn signature_failures_are_bad_requests() {
        let err = ApiError::from(SignatureError::TimestampOutsideTolerance);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("tolerance"));

        let err = ApiError::from(SignatureError::MissingHeader);
        assert_eq!(err.error_code(), 1003);

        let err = ApiError::from(SignatureError::InvalidSecret);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
