//! Webhook signature verification.
//!
//! The provider signs each delivery with HMAC-SHA256 over
//! `"<timestamp>.<raw body>"` and sends `t=<timestamp>,v1=<hex digest>` in
//! the `Stripe-Signature` header. Several `v1` entries may be present while
//! a secret is being rolled; any one of them matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::PaymentEvent;

type HmacSha256 = Hmac<Sha256>;

/// Name of the header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

const SIGNATURE_SCHEME: &str = "v1";

/// Reasons a delivery is rejected before any processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signature header was not sent.
    #[error("missing signature header")]
    MissingHeader,

    /// The header has no parseable timestamp.
    #[error("unable to extract timestamp and signatures from header")]
    MalformedHeader,

    /// The header carries no signature for the expected scheme.
    #[error("no signatures found with expected scheme")]
    NoSignatures,

    /// None of the signatures match the payload.
    #[error("no signatures found matching the expected signature for payload")]
    NoMatchingSignature,

    /// The signature timestamp is older than the tolerance window.
    #[error("timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,

    /// The configured secret cannot key the HMAC.
    #[error("webhook secret cannot be used as an HMAC key")]
    InvalidSecret,

    /// The payload verified but is not a valid event.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Authenticates raw webhook deliveries and decodes them into events.
pub trait SignatureVerifier: Send + Sync + std::fmt::Debug {
    /// Verifies `header` against the untouched `payload` bytes and, only
    /// then, parses the payload.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] if the signature does not verify or the
    /// verified payload is not an event.
    fn verify(&self, payload: &[u8], header: &str) -> Result<PaymentEvent, SignatureError>;
}

/// HMAC-SHA256 verifier for the payment provider's signing scheme.
#[derive(Clone)]
pub struct StripeSignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for StripeSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeSignatureVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish_non_exhaustive()
    }
}

impl StripeSignatureVerifier {
    /// Creates a verifier for `secret` accepting signatures up to
    /// `tolerance_secs` old.
    #[must_use]
    pub fn new(secret: impl Into<String>, tolerance_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: i64::try_from(tolerance_secs).unwrap_or(i64::MAX),
        }
    }

    /// Verifies as of the unix time `now`.
    ///
    /// # Errors
    ///
    /// See [`SignatureVerifier::verify`].
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> Result<PaymentEvent, SignatureError> {
        let parsed = parse_header(header)?;
        if parsed.signatures.is_empty() {
            return Err(SignatureError::NoSignatures);
        }

        let mac = signed_mac(&self.secret, parsed.timestamp, payload)?;
        let matched = parsed
            .signatures
            .iter()
            .filter_map(|sig| hex::decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());
        if !matched {
            return Err(SignatureError::NoMatchingSignature);
        }

        if parsed.timestamp < now.saturating_sub(self.tolerance_secs) {
            return Err(SignatureError::TimestampOutsideTolerance);
        }

        serde_json::from_slice(payload).map_err(|e| SignatureError::InvalidPayload(e.to_string()))
    }
}

impl SignatureVerifier for StripeSignatureVerifier {
    fn verify(&self, payload: &[u8], header: &str) -> Result<PaymentEvent, SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }
}

/// Computes the hex `v1` signature the provider would send for `payload`
/// at `timestamp`.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidSecret`] if `secret` cannot key the
/// HMAC.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a complete header value (`t=...,v1=...`).
///
/// # Errors
///
/// See [`compute_signature`].
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},{SIGNATURE_SCHEME}={signature}"))
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<ParsedHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for item in header.split(',') {
        let Some((key, value)) = item.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            SIGNATURE_SCHEME => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}
