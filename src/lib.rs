//! # clarity-gateway
//!
//! Backend of an AI visibility landing page: a visitor submits a website,
//! gets a language-model "visibility score", may buy an optimization plan
//! through a hosted checkout, and completes an onboarding form afterwards.
//!
//! Two pieces carry the weight:
//!
//! - **Payment event ingestion**: signed provider webhooks are verified over
//!   the raw body and applied exactly once to a durable payment record,
//!   despite at-least-once delivery.
//! - **Score normalization**: whatever the reasoning service answers, the
//!   caller gets a well-formed, bounded, self-consistent report.
//!
//! ## Architecture
//!
//! ```text
//! Browser / payment provider
//!     │
//!     ├── REST Handlers + origin gate (api/)
//!     │
//!     ├── PaymentIngestor, VisibilityService,
//!     │   CheckoutService, OnboardingService (service/)
//!     ├── BackgroundTasks (service/) ── Notifier, AnalyticsSink
//!     │
//!     ├── Stripe, OpenAI, Resend clients (clients/)
//!     │
//!     └── PaymentStore: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
