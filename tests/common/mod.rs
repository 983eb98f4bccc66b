//! Shared test doubles and app construction for router-level tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tokio::sync::Barrier;
use tower::ServiceExt;

use clarity_gateway::api;
use clarity_gateway::api::origin::OriginPolicy;
use clarity_gateway::app_state::AppState;
use clarity_gateway::clients::signature::signature_header;
use clarity_gateway::clients::{
    CheckoutError, CheckoutLink, CheckoutProvider, CheckoutRequest, Notifier, NotifyError,
    OutgoingEmail, ReasoningError, ReasoningService, SignatureVerifier, StripeSignatureVerifier,
};
use clarity_gateway::domain::{NewPayment, PaymentId, PaymentRecord, PaymentStatus};
use clarity_gateway::persistence::{MemoryPaymentStore, PaymentStore, StoreError};
use clarity_gateway::service::{
    BackgroundTasks, CheckoutService, OnboardingService, PaymentIngestor, VisibilityService,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const ALLOWED_ORIGIN: &str = "https://aiclarity.online";

/// Reasoning double returning a fixed answer and counting calls.
#[derive(Debug)]
pub struct CountingReasoning {
    pub answer: String,
    pub calls: AtomicUsize,
}

impl CountingReasoning {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningService for CountingReasoning {
    async fn complete_json(&self, _system: &str, _prompt: &str) -> Result<String, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

/// Notifier double keeping every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

/// Checkout double that succeeds unless `fail` is set.
#[derive(Debug, Default)]
pub struct FakeCheckout {
    pub fail: bool,
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    async fn create_session(&self, _request: &CheckoutRequest) -> Result<CheckoutLink, CheckoutError> {
        if self.fail {
            return Err(CheckoutError::Api {
                status: 402,
                message: "card_declined: secret detail".to_string(),
            });
        }
        Ok(CheckoutLink {
            id: "cs_test_123".to_string(),
            url: Some("https://checkout.stripe.com/c/pay/cs_test_123".to_string()),
        })
    }
}

/// Store wrapper that holds the first `gated` lookups at a barrier, so
/// concurrent deliveries all miss the record before any of them inserts.
#[derive(Debug)]
pub struct GatedStore {
    pub inner: Arc<MemoryPaymentStore>,
    gate: Barrier,
    gated: usize,
    lookups: AtomicUsize,
    pub conflicts: AtomicUsize,
}

impl GatedStore {
    pub fn new(inner: Arc<MemoryPaymentStore>, gated: usize) -> Self {
        Self {
            inner,
            gate: Barrier::new(gated),
            gated,
            lookups: AtomicUsize::new(0),
            conflicts: AtomicUsize::new(0),
        }
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentStore for GatedStore {
    async fn find_by_stripe_payment_id(
        &self,
        stripe_payment_id: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let found = self.inner.find_by_stripe_payment_id(stripe_payment_id).await;
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.gated {
            self.gate.wait().await;
        }
        found
    }

    async fn find_latest_by_email(&self, email: &str) -> Result<Option<PaymentRecord>, StoreError> {
        self.inner.find_latest_by_email(email).await
    }

    async fn insert(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let result = self.inner.insert(payment).await;
        if matches!(result, Err(StoreError::Conflict(_))) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    async fn advance_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        website: Option<&str>,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        self.inner.advance_status(id, status, website).await
    }
}

/// A router over in-memory doubles, with handles to inspect them.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPaymentStore>,
    pub gate: Option<Arc<GatedStore>>,
    pub reasoning: Arc<CountingReasoning>,
    pub notifier: Arc<RecordingNotifier>,
    pub tasks: BackgroundTasks,
}

pub const GOOD_ANSWER: &str = r#"{
    "status": "PARTIAL",
    "overallScore": 55,
    "pillars": [
        {"name": "Business Clarity", "score": 20, "description": "Clear offer"},
        {"name": "Audience Clarity", "score": 15, "description": "Some audience signals"},
        {"name": "Location Clarity", "score": 10, "description": "City mentioned once"},
        {"name": "Trust & Authority", "score": 10, "description": "Few reviews"}
    ],
    "businessDescription": "Artisan bakery",
    "targetAudience": "Local families",
    "location": "Porto",
    "gaps": ["No structured data"],
    "opportunities": ["Add LocalBusiness schema"]
}"#;

pub struct TestAppBuilder {
    answer: String,
    webhook_secret: Option<&'static str>,
    checkout_fails: bool,
    gated_lookups: usize,
}

impl TestAppBuilder {
    /// Holds the first `count` webhook lookups until all of them arrived.
    pub fn gated_lookups(mut self, count: usize) -> Self {
        self.gated_lookups = count;
        self
    }

    pub fn answer(mut self, answer: &str) -> Self {
        self.answer = answer.to_string();
        self
    }

    pub fn without_webhook_secret(mut self) -> Self {
        self.webhook_secret = None;
        self
    }

    pub fn failing_checkout(mut self) -> Self {
        self.checkout_fails = true;
        self
    }

    pub fn build(self) -> TestApp {
        let store = Arc::new(MemoryPaymentStore::new());
        let reasoning = Arc::new(CountingReasoning::new(&self.answer));
        let notifier = Arc::new(RecordingNotifier::default());
        let tasks = BackgroundTasks::new();
        let origins = OriginPolicy::new(vec![ALLOWED_ORIGIN.to_string()]);
        let gate = (self.gated_lookups > 0)
            .then(|| Arc::new(GatedStore::new(Arc::clone(&store), self.gated_lookups)));
        let ingest_store: Arc<dyn PaymentStore> = match &gate {
            Some(gate) => Arc::clone(gate) as Arc<dyn PaymentStore>,
            None => Arc::clone(&store) as Arc<dyn PaymentStore>,
        };

        let state = AppState {
            verifier: self.webhook_secret.map(|secret| {
                Arc::new(StripeSignatureVerifier::new(secret, 300)) as Arc<dyn SignatureVerifier>
            }),
            ingestor: Arc::new(PaymentIngestor::new(
                ingest_store,
                Arc::clone(&notifier) as Arc<dyn Notifier>,
                tasks.clone(),
                "https://site.io",
            )),
            visibility: Arc::new(VisibilityService::new(
                Arc::clone(&reasoning) as Arc<dyn ReasoningService>,
                Arc::clone(&notifier) as Arc<dyn Notifier>,
                None,
                tasks.clone(),
                "https://site.io",
                Duration::from_secs(5),
            )),
            checkout: Arc::new(CheckoutService::new(
                Arc::new(FakeCheckout {
                    fail: self.checkout_fails,
                }),
                19_700,
                "https://site.io",
            )),
            onboarding: Arc::new(OnboardingService::new(
                Arc::clone(&store) as Arc<dyn PaymentStore>,
            )),
            origins: Arc::new(origins.clone()),
            tasks: tasks.clone(),
        };

        TestApp {
            router: api::build_router(&origins).with_state(state),
            store,
            gate,
            reasoning,
            notifier,
            tasks,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            answer: GOOD_ANSWER.to_string(),
            webhook_secret: Some(WEBHOOK_SECRET),
            checkout_fails: false,
            gated_lookups: 0,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Sends one request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

/// Reads a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let Ok(value) = serde_json::from_slice(&bytes) else {
        panic!("body should be JSON: {}", String::from_utf8_lossy(&bytes));
    };
    value
}

/// A signed `checkout.session.completed` delivery.
pub fn paid_session_payload(session_id: &str, payment_intent: &str, email: &str) -> String {
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "object": "event",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "payment_status": "paid",
                "payment_intent": payment_intent,
                "customer_email": email,
                "metadata": { "website": "https://acme.io" }
            }
        }
    })
    .to_string()
}

/// `POST /api/v1/webhooks/stripe` signed with `secret` at the current time.
pub fn webhook_request(payload: &str, secret: &str) -> Request<Body> {
    let Ok(header) = signature_header(secret, chrono::Utc::now().timestamp(), payload.as_bytes())
    else {
        panic!("secret should key the hmac");
    };
    let Ok(request) = Request::post("/api/v1/webhooks/stripe")
        .header("stripe-signature", header)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
    else {
        panic!("valid request");
    };
    request
}

/// `POST <uri>` with a JSON body and optional `Origin`.
pub fn json_request(uri: &str, origin: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    let Ok(request) = builder.body(Body::from(body.to_string())) else {
        panic!("valid request");
    };
    request
}
