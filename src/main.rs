//! clarity-gateway server entry point.
//!
//! Wires configuration, store and outbound clients into the Axum HTTP
//! server, and drains background work on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clarity_gateway::api;
use clarity_gateway::api::origin::OriginPolicy;
use clarity_gateway::app_state::AppState;
use clarity_gateway::clients::{
    AnalyticsSink, LogNotifier, Notifier, OpenAiClient, ResendNotifier, SignatureVerifier,
    StripeCheckoutClient, StripeSignatureVerifier, WebhookAnalytics,
};
use clarity_gateway::config::AppConfig;
use clarity_gateway::persistence::{MemoryPaymentStore, PaymentStore, PostgresPaymentStore};
use clarity_gateway::service::{
    BackgroundTasks, CheckoutService, OnboardingService, PaymentIngestor, VisibilityService,
};

/// Timeout of email, analytics and checkout calls.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting clarity-gateway");

    let state = build_state(&config).await?;
    let tasks = state.tasks.clone();

    // Build router
    let app = Router::new()
        .merge(api::build_router(&state.origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(pending = tasks.pending(), "draining background tasks");
    tasks.drain().await;
    tracing::info!("server shut down");

    Ok(())
}

/// Builds the store, clients and services described by `config`.
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn PaymentStore> = if config.persistence_enabled {
        Arc::new(
            PostgresPaymentStore::connect(config)
                .await
                .context("connecting to PostgreSQL")?,
        )
    } else {
        tracing::warn!("persistence disabled, payment records are kept in memory");
        Arc::new(MemoryPaymentStore::new())
    };

    let verifier = config.stripe_webhook_secret.as_ref().map(|secret| {
        Arc::new(StripeSignatureVerifier::new(
            secret.clone(),
            config.signature_tolerance_secs,
        )) as Arc<dyn SignatureVerifier>
    });
    if verifier.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will be rejected");
    }

    let notifier: Arc<dyn Notifier> = match &config.resend_api_key {
        Some(key) => Arc::new(
            ResendNotifier::new(key.clone(), config.resend_from_email.clone(), OUTBOUND_TIMEOUT)
                .context("building email client")?,
        ),
        None => {
            tracing::warn!("RESEND_API_KEY not set, emails are logged only");
            Arc::new(LogNotifier)
        }
    };

    let analytics = match &config.analytics_webhook_url {
        Some(url) => Some(Arc::new(
            WebhookAnalytics::new(url.clone(), OUTBOUND_TIMEOUT)
                .context("building analytics client")?,
        ) as Arc<dyn AnalyticsSink>),
        None => None,
    };

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, every analysis returns the fallback report");
    }
    let reasoning_timeout = Duration::from_secs(config.reasoning_timeout_secs);
    let reasoning = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        reasoning_timeout,
    )
    .context("building reasoning client")?;

    let checkout_provider = StripeCheckoutClient::new(config.stripe_secret_key.clone(), OUTBOUND_TIMEOUT)
        .context("building checkout client")?;

    let tasks = BackgroundTasks::new();

    Ok(AppState {
        verifier,
        ingestor: Arc::new(PaymentIngestor::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            tasks.clone(),
            config.site_url.clone(),
        )),
        visibility: Arc::new(VisibilityService::new(
            Arc::new(reasoning),
            notifier,
            analytics,
            tasks.clone(),
            config.site_url.clone(),
            reasoning_timeout,
        )),
        checkout: Arc::new(CheckoutService::new(
            Arc::new(checkout_provider),
            config.checkout_price_cents,
            config.site_url.clone(),
        )),
        onboarding: Arc::new(OnboardingService::new(store)),
        origins: Arc::new(OriginPolicy::new(config.allowed_origins.clone())),
        tasks,
    })
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
