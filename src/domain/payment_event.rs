//! Payment-provider webhook events.
//!
//! Only the fields the ingestor reads are modelled. The provider sends far
//! more; everything else is ignored by serde. The event object is kept as
//! raw JSON until the event type is known, since its shape depends on it.

use std::collections::HashMap;

use serde::Deserialize;

/// Event type of a completed hosted checkout.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Event type of a succeeded payment intent.
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// `payment_status` value of a checkout session that was actually charged.
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// A verified webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    /// Provider event identifier (`evt_...`).
    pub id: String,
    /// Dotted event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload wrapper.
    pub data: EventData,
}

/// The `data` member of a [`PaymentEvent`].
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The event-specific object, interpreted according to the event type.
    pub object: serde_json::Value,
}

/// A hosted checkout session as carried by `checkout.session.completed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    /// Session identifier (`cs_...`).
    pub id: String,
    /// Email supplied when the session was created, if any.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Details collected by the hosted page.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Arbitrary metadata attached at session creation.
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Payment intent created for the session, if any.
    #[serde(default)]
    pub payment_intent: Option<String>,
}

/// Customer details collected during checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    /// Email typed into the hosted page.
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    /// Returns `true` when the session reports a successful charge.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some(PAYMENT_STATUS_PAID)
    }

    /// Customer email, preferring the session field over the collected
    /// details. Empty strings count as absent.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        non_empty(self.customer_email.as_deref()).or_else(|| {
            self.customer_details
                .as_ref()
                .and_then(|details| non_empty(details.email.as_deref()))
        })
    }

    /// Website from session metadata, if present and non-empty.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|meta| non_empty(meta.get("website").map(String::as_str)))
    }

    /// The idempotency key: the payment intent if present, else the
    /// session id.
    #[must_use]
    pub fn idempotency_key(&self) -> &str {
        non_empty(self.payment_intent.as_deref()).unwrap_or(&self.id)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn session(json: serde_json::Value) -> CheckoutSession {
        let Ok(session) = serde_json::from_value(json) else {
            panic!("valid session json");
        };
        session
    }

    #[test]
    fn parses_envelope() {
        let raw = r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1"}},"livemode":false}"#;
        let Ok(event) = serde_json::from_str::<PaymentEvent>(raw) else {
            panic!("valid event");
        };
        assert_eq!(event.event_type, CHECKOUT_SESSION_COMPLETED);
        assert_eq!(event.data.object["id"], "cs_1");
    }

    #[test]
    fn email_falls_back_to_customer_details() {
        let s = session(serde_json::json!({
            "id": "cs_1",
            "customer_email": null,
            "customer_details": { "email": "c@d.com" }
        }));
        assert_eq!(s.email(), Some("c@d.com"));

        let s = session(serde_json::json!({
            "id": "cs_1",
            "customer_email": "a@b.com",
            "customer_details": { "email": "c@d.com" }
        }));
        assert_eq!(s.email(), Some("a@b.com"));

        let s = session(serde_json::json!({ "id": "cs_1", "customer_email": "" }));
        assert_eq!(s.email(), None);
    }

    #[test]
    fn idempotency_key_prefers_payment_intent() {
        let s = session(serde_json::json!({ "id": "cs_1", "payment_intent": "pi_123" }));
        assert_eq!(s.idempotency_key(), "pi_123");

        let s = session(serde_json::json!({ "id": "cs_1", "payment_intent": null }));
        assert_eq!(s.idempotency_key(), "cs_1");
    }

    #[test]
    fn empty_website_metadata_is_absent() {
        let s = session(serde_json::json!({ "id": "cs_1", "metadata": { "website": "" } }));
        assert_eq!(s.website(), None);

        let s = session(serde_json::json!({ "id": "cs_1", "metadata": { "website": "acme.io" } }));
        assert_eq!(s.website(), Some("acme.io"));
    }
}
